use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::fs;
use tracing::info;

use communities::CommunitySummary;
use graph::GraphExport;

use crate::KnowledgeBase;

#[derive(Serialize)]
struct ChunkRecord<'a> {
    id: usize,
    text: &'a str,
    length: usize,
}

#[derive(Serialize)]
struct ChunksDocument<'a> {
    chunks: Vec<ChunkRecord<'a>>,
    total_chunks: usize,
}

#[derive(Serialize)]
struct CommunityRecord {
    community_id: usize,
    entities: Vec<String>,
}

#[derive(Serialize)]
struct GraphDocument<'a> {
    #[serde(flatten)]
    graph: GraphExport,
    communities: Vec<CommunityRecord>,
    summaries: &'a [CommunitySummary],
    metadata: Metadata,
}

#[derive(Serialize)]
struct Metadata {
    num_chunks: usize,
    num_entities: usize,
    num_relations: usize,
    num_communities: usize,
}

/// Dump `chunks.json` and `graph.json` for a built base under `dir`,
/// creating the directory if needed. `chunks.json` holds every chunk with
/// its character length; `graph.json` holds the flattened graph plus
/// community membership, summaries and the build counts.
pub async fn export_artifacts(base: &KnowledgeBase, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create artifact directory {}", dir.display()))?;

    let chunks = ChunksDocument {
        chunks: base
            .chunks()
            .iter()
            .map(|chunk| ChunkRecord {
                id: chunk.id,
                text: &chunk.text,
                length: chunk.text.chars().count(),
            })
            .collect(),
        total_chunks: base.chunks().len(),
    };
    write_json(&dir.join("chunks.json"), &chunks).await?;

    let names = base.graph().entity_names();
    let communities = base
        .partition()
        .groups()
        .iter()
        .enumerate()
        .map(|(community_id, members)| CommunityRecord {
            community_id,
            entities: members.iter().map(|&node| names[node].to_string()).collect(),
        })
        .collect();

    let stats = base.stats();
    let graph_doc = GraphDocument {
        graph: GraphExport::from_graph(base.graph()),
        communities,
        summaries: base.summaries(),
        metadata: Metadata {
            num_chunks: stats.chunks,
            num_entities: stats.entities,
            num_relations: stats.relations,
            num_communities: stats.communities,
        },
    };
    write_json(&dir.join("graph.json"), &graph_doc).await?;

    info!(dir = %dir.display(), "artifacts exported");
    Ok(())
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
