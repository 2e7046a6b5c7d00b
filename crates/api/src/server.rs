use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use ingest::FileReader;
use pipeline::{Answer, BuildStats, KnowledgeBase, Pipeline, export_artifacts};
use query::Mode;

use crate::config::AppConfig;
use crate::metrics::{Metrics, MetricsSnapshot, TimedOperation};

/// Shared server state: one pipeline, many built knowledge bases.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
    bases: Arc<DashMap<Uuid, Arc<KnowledgeBase>>>,
    metrics: Arc<Metrics>,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, config: AppConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            bases: Arc::new(DashMap::new()),
            metrics: Metrics::new(),
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    /// Path to a .txt/.md file or a directory of them. Wins over `text`
    /// when both are given.
    pub path: Option<String>,
    /// Inline document text.
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub id: Uuid,
    pub stats: BuildStats,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub id: Uuid,
    pub question: String,
    #[serde(default)]
    pub mode: Mode,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ollama: String,
    pub knowledge_bases: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ingest", post(ingest_document))
        .route("/query", post(answer_question))
        .route("/stats/:id", get(get_stats))
        .route("/metrics", get(get_metrics))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Bind the configured address and serve until the process is stopped.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");
    axum::serve(listener, router(state))
        .await
        .context("server terminated")?;
    Ok(())
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ollama = match reqwest::get(&state.config.ollama.base_url).await {
        Ok(resp) if resp.status().is_success() => "ok".to_string(),
        Ok(resp) => format!("error: status {}", resp.status()),
        Err(e) => format!("error: {e}"),
    };
    Json(HealthResponse {
        ollama,
        knowledge_bases: state.bases.len(),
    })
}

async fn ingest_document(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, StatusCode> {
    let timer = TimedOperation::start();
    let text = match read_corpus(&req).await {
        Ok(text) => text,
        Err(status) => {
            state.metrics.record_request(false);
            return Err(status);
        }
    };

    let base = match state.pipeline.build(&text).await {
        Ok(base) => base,
        Err(e) => {
            error!(error = %e, "build failed");
            state.metrics.record_request(false);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let stats = base.stats();
    let id = Uuid::new_v4();

    if state.config.export.enabled {
        let dir = state.config.export.dir.join(id.to_string());
        // Export failures lose the artifact files, not the build.
        if let Err(e) = export_artifacts(&base, &dir).await {
            error!(error = %e, dir = %dir.display(), "artifact export failed");
        }
    }

    state.bases.insert(id, Arc::new(base));
    state.metrics.record_build(timer.elapsed(), &stats);
    state.metrics.record_request(true);
    info!(
        id = %id,
        chunks = stats.chunks,
        entities = stats.entities,
        communities = stats.communities,
        "knowledge base registered"
    );

    Ok(Json(IngestResponse { id, stats }))
}

async fn read_corpus(req: &IngestRequest) -> Result<String, StatusCode> {
    if let Some(path) = &req.path {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(StatusCode::NOT_FOUND);
        }
        FileReader::read_path(&path).await.map_err(|e| {
            error!(error = %e, path = %path.display(), "failed to read corpus");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    } else if let Some(text) = &req.text {
        Ok(text.clone())
    } else {
        Err(StatusCode::BAD_REQUEST)
    }
}

async fn answer_question(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<Answer>, StatusCode> {
    let Some(base) = state.bases.get(&req.id).map(|entry| entry.value().clone()) else {
        state.metrics.record_request(false);
        return Err(StatusCode::NOT_FOUND);
    };

    let timer = TimedOperation::start();
    match base.answer(&req.question, req.mode).await {
        Ok(answer) => {
            state.metrics.record_query(timer.elapsed());
            state.metrics.record_request(true);
            Ok(Json(answer))
        }
        Err(e) => {
            error!(error = %e, id = %req.id, "query failed");
            state.metrics.record_request(false);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn get_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BuildStats>, StatusCode> {
    match state.bases.get(&id).map(|entry| entry.stats()) {
        Some(stats) => Ok(Json(stats)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

async fn get_metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
