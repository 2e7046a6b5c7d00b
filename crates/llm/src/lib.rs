pub mod cache;
pub mod ollama;
pub mod retry;
pub mod similarity;
pub mod testing;

pub use cache::CachedEmbedder;
pub use ollama::{OllamaConfig, OllamaEmbedder, OllamaGenerator};
pub use retry::{RetryConfig, RetryPolicy};
pub use similarity::cosine_similarity;

use anyhow::Result;
use async_trait::async_trait;

/// Maps text to a fixed-length vector. Vectors from the same embedder are
/// comparable via cosine similarity; no other vector operation is assumed.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Generates free text from a prompt. Used for entity extraction, community
/// summaries and final answers.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
