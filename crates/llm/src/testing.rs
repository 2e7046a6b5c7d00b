//! Deterministic in-process collaborators for tests. Downstream crates use
//! these instead of a live Ollama instance.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::{Embedder, TextGenerator};

/// Embeds text as a vector of keyword occurrence counts. Texts sharing
/// keywords get high cosine similarity; texts with disjoint keywords are
/// orthogonal. Matching is case-insensitive substring containment.
pub struct KeywordEmbedder {
    keywords: Vec<String>,
}

impl KeywordEmbedder {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lowered = text.to_lowercase();
        Ok(self
            .keywords
            .iter()
            .map(|k| lowered.matches(k.as_str()).count() as f32)
            .collect())
    }
}

/// Returns one fixed vector for every input. Useful when a test controls
/// entity and chunk embeddings directly and only the query goes through
/// the embedder.
pub struct StaticEmbedder {
    vector: Vec<f32>,
}

impl StaticEmbedder {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

#[async_trait]
impl Embedder for StaticEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(self.vector.clone())
    }
}

/// Replays scripted replies in order (repeating the last one when the
/// script runs out) and records every prompt it was given.
pub struct CannedGenerator {
    replies: Mutex<VecDeque<String>>,
    last: String,
    prompts: Mutex<Vec<String>>,
}

impl CannedGenerator {
    pub fn new(reply: &str) -> Self {
        Self::with_replies(vec![reply.to_string()])
    }

    pub fn with_replies(replies: Vec<String>) -> Self {
        let last = replies.last().cloned().unwrap_or_default();
        Self {
            replies: Mutex::new(replies.into()),
            last,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut replies = self.replies.lock().unwrap();
        Ok(replies.pop_front().unwrap_or_else(|| self.last.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosine_similarity;

    #[tokio::test]
    async fn test_keyword_embedder_similarity() {
        let embedder = KeywordEmbedder::new(&["law", "cricket"]);

        let a = embedder.embed("The law of the land").await.unwrap();
        let b = embedder.embed("Constitutional law").await.unwrap();
        let c = embedder.embed("A cricket match").await.unwrap();

        assert!(cosine_similarity(&a, &b) > 0.99);
        assert_eq!(cosine_similarity(&a, &c), 0.0);
    }

    #[tokio::test]
    async fn test_canned_generator_replays_script() {
        let generator = CannedGenerator::with_replies(vec!["one".into(), "two".into()]);

        assert_eq!(generator.generate("p1").await.unwrap(), "one");
        assert_eq!(generator.generate("p2").await.unwrap(), "two");
        assert_eq!(generator.generate("p3").await.unwrap(), "two");
        assert_eq!(generator.prompts().len(), 3);
    }
}
