pub mod store;

pub use store::EmbeddingStore;
