//! End-to-end construction and retrieval against deterministic in-process
//! collaborators.

use std::sync::Arc;

use communities::LouvainConfig;
use extract::testing::ScriptedExtractor;
use graph::CO_OCCURS;
use ingest::ChunkerConfig;
use llm::testing::{CannedGenerator, KeywordEmbedder};
use pipeline::{Pipeline, PipelineConfig, export_artifacts};
use query::Mode;

const TEXT: &str = "Ambedkar drafted the Constitution. \
                    Ambedkar wrote the Constitution draft. \
                    Cricket is played in summer. \
                    Cricket uses a willow bat.";

fn config() -> PipelineConfig {
    PipelineConfig {
        // buffer_size 0 keeps each embedding window equal to its sentence,
        // which makes the keyword vectors easy to reason about.
        chunker: ChunkerConfig {
            buffer_size: 0,
            ..ChunkerConfig::default()
        },
        louvain: LouvainConfig {
            seed: Some(7),
            ..LouvainConfig::default()
        },
        ..PipelineConfig::default()
    }
}

fn extractor() -> Arc<ScriptedExtractor> {
    Arc::new(
        ScriptedExtractor::new()
            .on(
                "Ambedkar",
                &["ambedkar", "constitution"],
                &[("ambedkar", "constitution", "drafted")],
            )
            // No scripted relations: the builder falls back to co-occurrence.
            .on("Cricket", &["cricket", "bat"], &[]),
    )
}

fn embedder() -> Arc<KeywordEmbedder> {
    Arc::new(KeywordEmbedder::new(&[
        "ambedkar",
        "constitution",
        "cricket",
        "bat",
    ]))
}

fn pipeline_with(generator: Arc<CannedGenerator>) -> Pipeline {
    let extractor = extractor();
    Pipeline::new(
        embedder(),
        extractor.clone(),
        extractor,
        generator,
        config(),
    )
}

#[tokio::test]
async fn build_produces_chunks_graph_communities_and_summaries() {
    let generator = Arc::new(CannedGenerator::with_replies(vec![
        "The constitutional community centered on Ambedkar.".to_string(),
        "The cricket community.".to_string(),
    ]));
    let base = pipeline_with(generator).build(TEXT).await.unwrap();

    let stats = base.stats();
    assert_eq!(stats.chunks, 2);
    assert_eq!(stats.entities, 4);
    assert_eq!(stats.relations, 2);
    assert_eq!(stats.communities, 2);

    // The two topics land in separate chunks.
    assert!(base.chunks()[0].text.contains("Ambedkar"));
    assert!(base.chunks()[1].text.contains("Cricket"));

    // Scripted relation on one edge, co-occurrence fallback on the other.
    let drafted = base.graph().edge("ambedkar", "constitution").unwrap();
    assert!(drafted.relations.contains("drafted"));
    let fallback = base.graph().edge("cricket", "bat").unwrap();
    assert!(fallback.relations.contains(CO_OCCURS));

    // Every entity is assigned to exactly one community, and the two
    // disconnected pairs cannot share one.
    let partition = base.partition();
    assert_eq!(partition.node_count(), 4);
    let names = base.graph().entity_names();
    let ambedkar = names.iter().position(|&n| n == "ambedkar").unwrap();
    let cricket = names.iter().position(|&n| n == "cricket").unwrap();
    assert_ne!(
        partition.community_of(ambedkar),
        partition.community_of(cricket)
    );

    // One summary per community, in community id order.
    let summaries = base.summaries();
    assert_eq!(summaries.len(), 2);
    for (i, summary) in summaries.iter().enumerate() {
        assert_eq!(summary.community_id, i);
        assert!(!summary.summary.is_empty());
        assert!(!summary.key_entities.is_empty());
    }

    // The store covers every chunk and entity.
    assert_eq!(base.store().chunk_count(), 2);
    assert_eq!(base.store().entity_count(), 4);
}

#[tokio::test]
async fn short_entity_question_is_answered_locally_with_citations() {
    let generator = Arc::new(CannedGenerator::with_replies(vec![
        "The constitutional community centered on Ambedkar.".to_string(),
        "The cricket community.".to_string(),
        "Ambedkar drafted the Constitution [Chunk-0].".to_string(),
    ]));
    let base = pipeline_with(generator.clone()).build(TEXT).await.unwrap();

    let answer = base
        .answer("Who drafted the Constitution?", Mode::Auto)
        .await
        .unwrap();

    assert_eq!(answer.mode, Mode::Local);
    assert_eq!(answer.answer, "Ambedkar drafted the Constitution [Chunk-0].");
    // The constitution chunk outranks everything else.
    assert_eq!(answer.chunk_ids[0], 0);
    assert_eq!(answer.community_ids[0], 0);

    // Two community summaries plus one answer prompt.
    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 3);
    let answer_prompt = &prompts[2];
    assert!(answer_prompt.contains("=== Community Summaries (Broad Context) ==="));
    assert!(answer_prompt.contains("[Community-0]"));
    assert!(answer_prompt.contains("[Chunk-0] Ambedkar drafted the Constitution."));
    assert!(answer_prompt.contains("Who drafted the Constitution?"));
}

#[tokio::test]
async fn thematic_question_resolves_to_global_mode() {
    let generator = Arc::new(CannedGenerator::new("A thematic synthesis."));
    let base = pipeline_with(generator).build(TEXT).await.unwrap();

    let answer = base
        .answer("What are the overarching themes of this text?", Mode::Auto)
        .await
        .unwrap();

    assert_eq!(answer.mode, Mode::Global);
    // Global context still arrives even when no entity matched.
    assert!(!answer.community_ids.is_empty());
}

#[tokio::test]
async fn explicit_mode_is_respected() {
    let generator = Arc::new(CannedGenerator::new("An answer."));
    let base = pipeline_with(generator).build(TEXT).await.unwrap();

    let answer = base
        .answer("Who drafted the Constitution?", Mode::Global)
        .await
        .unwrap();

    assert_eq!(answer.mode, Mode::Global);
}

#[tokio::test]
async fn concurrent_queries_share_one_base() {
    let generator = Arc::new(CannedGenerator::new("An answer."));
    let base = Arc::new(pipeline_with(generator).build(TEXT).await.unwrap());

    let (a, b) = tokio::join!(
        base.answer("Who drafted the Constitution?", Mode::Auto),
        base.answer("Tell me about cricket.", Mode::Auto),
    );

    assert_eq!(a.unwrap().mode, Mode::Local);
    assert_eq!(b.unwrap().mode, Mode::Local);
}

#[tokio::test]
async fn empty_text_builds_an_empty_but_queryable_base() {
    let generator = Arc::new(CannedGenerator::new("Insufficient context."));
    let base = pipeline_with(generator).build("").await.unwrap();

    let stats = base.stats();
    assert_eq!(stats.chunks, 0);
    assert_eq!(stats.entities, 0);
    assert_eq!(stats.communities, 0);

    let answer = base.answer("Anything?", Mode::Auto).await.unwrap();
    assert_eq!(answer.mode, Mode::Global);
    assert!(answer.chunk_ids.is_empty());
    assert!(answer.community_ids.is_empty());
    assert_eq!(answer.answer, "Insufficient context.");
}

#[tokio::test]
async fn artifacts_are_written_as_json() {
    let generator = Arc::new(CannedGenerator::new("A summary."));
    let base = pipeline_with(generator).build(TEXT).await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("artifacts");

    export_artifacts(&base, &out).await.unwrap();

    let chunks: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("chunks.json")).unwrap()).unwrap();
    assert_eq!(chunks["total_chunks"], 2);
    assert_eq!(chunks["chunks"][0]["id"], 0);
    assert!(chunks["chunks"][0]["text"].as_str().unwrap().contains("Ambedkar"));

    let graph: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("graph.json")).unwrap()).unwrap();
    assert_eq!(graph["entities"].as_array().unwrap().len(), 4);
    assert_eq!(graph["relations"].as_array().unwrap().len(), 2);
    assert_eq!(graph["communities"].as_array().unwrap().len(), 2);
    assert_eq!(graph["summaries"].as_array().unwrap().len(), 2);
    assert_eq!(graph["metadata"]["num_entities"], 4);
}
