use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use llm::{Embedder, cosine_similarity};

use crate::chunk::Chunk;
use crate::sentence::split_sentences;

/// Tunables for the buffered-window semantic chunker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Cosine-distance cutoff below which adjacent sentences share a chunk.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
    /// Sentences of context appended on each side before embedding.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Upper bound on tokens per chunk during grouping.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Window length used when an oversized chunk is re-split.
    #[serde(default = "default_subchunk_tokens")]
    pub subchunk_tokens: usize,
    /// Tokens repeated between consecutive sub-chunks.
    #[serde(default = "default_overlap_tokens")]
    pub overlap_tokens: usize,
}

fn default_similarity_threshold() -> f32 {
    0.3
}

fn default_buffer_size() -> usize {
    2
}

fn default_max_tokens() -> usize {
    1024
}

fn default_subchunk_tokens() -> usize {
    128
}

fn default_overlap_tokens() -> usize {
    20
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            buffer_size: default_buffer_size(),
            max_tokens: default_max_tokens(),
            subchunk_tokens: default_subchunk_tokens(),
            overlap_tokens: default_overlap_tokens(),
        }
    }
}

/// Groups sentences into topically coherent chunks.
///
/// Each sentence is embedded together with `buffer_size` neighbours on both
/// sides so the vector reflects local context rather than one sentence in
/// isolation. Adjacent sentences stay in the same chunk while the cosine
/// distance between their buffered embeddings is below the threshold and the
/// chunk stays under `max_tokens`.
pub struct SemanticChunker {
    config: ChunkerConfig,
}

impl SemanticChunker {
    pub fn new(config: ChunkerConfig) -> Self {
        debug_assert!(
            config.overlap_tokens < config.subchunk_tokens,
            "overlap must leave forward progress when sub-chunking"
        );
        Self { config }
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk a document. Empty input produces no chunks; ids are assigned
    /// densely in document order.
    pub async fn chunk(&self, text: &str, embedder: &dyn Embedder) -> Result<Vec<Chunk>> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let groups = if sentences.len() == 1 {
            vec![sentences[0].clone()]
        } else {
            self.group_sentences(&sentences, embedder).await?
        };

        // Grouping can only exceed the cap when a single sentence is longer
        // than max_tokens, so re-split those into overlapping windows.
        let mut texts = Vec::new();
        for group in groups {
            if token_count(&group) > self.config.max_tokens {
                texts.extend(self.split_oversized(&group));
            } else {
                texts.push(group);
            }
        }

        debug!(
            sentences = sentences.len(),
            chunks = texts.len(),
            "chunked document"
        );

        Ok(texts
            .into_iter()
            .enumerate()
            .map(|(id, text)| Chunk::new(id, text))
            .collect())
    }

    async fn group_sentences(
        &self,
        sentences: &[String],
        embedder: &dyn Embedder,
    ) -> Result<Vec<String>> {
        let windows = self.buffered_windows(sentences);
        let mut embeddings = Vec::with_capacity(windows.len());
        for window in &windows {
            embeddings.push(embedder.embed(window).await?);
        }

        let mut groups = Vec::new();
        let mut current = sentences[0].clone();
        let mut current_tokens = token_count(&current);

        for i in 0..sentences.len() - 1 {
            let distance = 1.0 - cosine_similarity(&embeddings[i], &embeddings[i + 1]);
            let next = &sentences[i + 1];
            let next_tokens = token_count(next);

            if distance < self.config.similarity_threshold
                && current_tokens + next_tokens <= self.config.max_tokens
            {
                current.push(' ');
                current.push_str(next);
                current_tokens += next_tokens;
            } else {
                groups.push(std::mem::replace(&mut current, next.clone()));
                current_tokens = next_tokens;
            }
        }
        groups.push(current);

        Ok(groups)
    }

    fn buffered_windows(&self, sentences: &[String]) -> Vec<String> {
        let n = sentences.len();
        (0..n)
            .map(|i| {
                let start = i.saturating_sub(self.config.buffer_size);
                let end = (i + self.config.buffer_size + 1).min(n);
                sentences[start..end].join(" ")
            })
            .collect()
    }

    fn split_oversized(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut out = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + self.config.subchunk_tokens).min(words.len());
            out.push(words[start..end].join(" "));
            start = if end < words.len() {
                end - self.config.overlap_tokens
            } else {
                end
            };
        }
        out
    }
}

fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm::testing::KeywordEmbedder;

    fn flat_config() -> ChunkerConfig {
        // buffer_size 0 keeps each window equal to its sentence, which makes
        // the keyword embeddings easy to reason about.
        ChunkerConfig {
            similarity_threshold: 0.3,
            buffer_size: 0,
            max_tokens: 1024,
            subchunk_tokens: 128,
            overlap_tokens: 20,
        }
    }

    #[tokio::test]
    async fn merges_similar_sentences_and_splits_at_topic_shift() {
        let chunker = SemanticChunker::new(flat_config());
        let embedder = KeywordEmbedder::new(&["cat", "rain", "snow"]);
        let text = "The cat sat. The cat slept. Rain fell today. Snow fell later.";

        let chunks = chunker.chunk(text, &embedder).await.unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "The cat sat. The cat slept.");
        assert_eq!(chunks[1].text, "Rain fell today.");
        assert_eq!(chunks[2].text, "Snow fell later.");
    }

    #[tokio::test]
    async fn token_cap_closes_chunk_despite_similarity() {
        let mut config = flat_config();
        config.max_tokens = 5;
        let chunker = SemanticChunker::new(config);
        let embedder = KeywordEmbedder::new(&["cat"]);
        let text = "The cat sat. The cat slept.";

        let chunks = chunker.chunk(text, &embedder).await.unwrap();

        // Both sentences score identically, but 3 + 3 tokens would exceed 5.
        assert_eq!(chunks.len(), 2);
    }

    #[tokio::test]
    async fn oversized_sentence_splits_into_overlapping_windows() {
        let mut config = flat_config();
        config.max_tokens = 10;
        config.subchunk_tokens = 6;
        config.overlap_tokens = 2;
        let chunker = SemanticChunker::new(config);
        let embedder = KeywordEmbedder::new(&["w"]);
        let words: Vec<String> = (1..=20).map(|i| format!("w{i}")).collect();
        let text = words.join(" ");

        let chunks = chunker.chunk(&text, &embedder).await.unwrap();

        let sizes: Vec<usize> = chunks.iter().map(Chunk::token_count).collect();
        assert_eq!(sizes, vec![6, 6, 6, 6, 4]);
        assert!(chunks[0].text.starts_with("w1 "));
        // Overlap repeats the last two tokens of the previous window.
        assert!(chunks[1].text.starts_with("w5 w6"));
    }

    #[tokio::test]
    async fn empty_input_yields_no_chunks() {
        let chunker = SemanticChunker::new(flat_config());
        let embedder = KeywordEmbedder::new(&["x"]);

        let chunks = chunker.chunk("", &embedder).await.unwrap();

        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn single_sentence_becomes_one_chunk_without_embedding() {
        let chunker = SemanticChunker::new(flat_config());
        let embedder = KeywordEmbedder::new(&["x"]);

        let chunks = chunker.chunk("Just one sentence.", &embedder).await.unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, 0);
        assert_eq!(chunks[0].text, "Just one sentence.");
    }

    #[tokio::test]
    async fn ids_are_dense_and_text_is_preserved() {
        let chunker = SemanticChunker::new(flat_config());
        let embedder = KeywordEmbedder::new(&["cat", "rain"]);
        let text = "The cat sat. Rain fell today. The cat slept.";

        let chunks = chunker.chunk(text, &embedder).await.unwrap();

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.id, i);
        }
        let rejoined: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        for word in text.split_whitespace() {
            assert!(rejoined.iter().any(|c| c.contains(word)));
        }
    }
}
