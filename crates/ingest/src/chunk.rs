use serde::{Deserialize, Serialize};

/// A contiguous span of source text produced by the semantic chunker.
///
/// Chunk ids are dense indices assigned in document order, so they double
/// as positions into per-chunk side tables (embeddings, graph origins).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub id: usize,
    pub text: String,
}

impl Chunk {
    pub fn new(id: usize, text: String) -> Self {
        Self { id, text }
    }

    /// Number of whitespace-delimited tokens in the chunk text.
    pub fn token_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_count_splits_on_whitespace() {
        let chunk = Chunk::new(0, "one two  three\nfour".to_string());
        assert_eq!(chunk.token_count(), 4);
    }

    #[test]
    fn empty_chunk_has_zero_tokens() {
        let chunk = Chunk::new(0, String::new());
        assert_eq!(chunk.token_count(), 0);
    }
}
