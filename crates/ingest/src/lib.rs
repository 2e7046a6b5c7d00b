pub mod chunk;
pub mod chunker;
pub mod reader;
pub mod sentence;

pub use chunk::Chunk;
pub use chunker::{ChunkerConfig, SemanticChunker};
pub use reader::FileReader;
pub use sentence::split_sentences;
