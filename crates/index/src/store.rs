use std::collections::HashMap;

use anyhow::Result;
use tracing::debug;

use ingest::Chunk;
use llm::Embedder;

/// In-memory vector store for one knowledge base.
///
/// Chunk vectors live in a dense table indexed by chunk id; entity vectors
/// are keyed by normalized entity name. Filled during the build phase, then
/// read-only at query time.
#[derive(Default)]
pub struct EmbeddingStore {
    chunks: Vec<Vec<f32>>,
    entities: HashMap<String, Vec<f32>>,
}

impl EmbeddingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embed a chunk's text and store it. Chunks must arrive in id order so
    /// the table index equals the chunk id.
    pub async fn embed_chunk(&mut self, chunk: &Chunk, embedder: &dyn Embedder) -> Result<()> {
        debug_assert_eq!(chunk.id, self.chunks.len(), "chunks must arrive in id order");
        let vector = embedder.embed(&chunk.text).await?;
        self.push_chunk(vector);
        Ok(())
    }

    /// Embed an entity name and store it. Already-stored names are skipped,
    /// so repeated mentions across chunks cost one call.
    pub async fn embed_entity(&mut self, name: &str, embedder: &dyn Embedder) -> Result<()> {
        if self.entities.contains_key(name) {
            return Ok(());
        }
        let vector = embedder.embed(name).await?;
        self.entities.insert(name.to_string(), vector);
        Ok(())
    }

    /// Store a precomputed chunk vector, returning its chunk id.
    pub fn push_chunk(&mut self, vector: Vec<f32>) -> usize {
        self.chunks.push(vector);
        self.chunks.len() - 1
    }

    /// Store a precomputed entity vector.
    pub fn insert_entity(&mut self, name: impl Into<String>, vector: Vec<f32>) {
        self.entities.insert(name.into(), vector);
    }

    pub fn chunk_vector(&self, id: usize) -> Option<&[f32]> {
        self.chunks.get(id).map(Vec::as_slice)
    }

    pub fn entity_vector(&self, name: &str) -> Option<&[f32]> {
        self.entities.get(name).map(Vec::as_slice)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Chunk vectors with their ids, in id order.
    pub fn chunks(&self) -> impl Iterator<Item = (usize, &[f32])> {
        self.chunks.iter().enumerate().map(|(id, v)| (id, v.as_slice()))
    }

    /// Entity vectors with their names, in arbitrary order.
    pub fn entities(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.entities.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn log_sizes(&self) {
        debug!(
            chunks = self.chunks.len(),
            entities = self.entities.len(),
            "embedding store filled"
        );
    }
}
