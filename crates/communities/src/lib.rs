pub mod louvain;
pub mod partition;
pub mod summarizer;

pub use louvain::{LouvainConfig, LouvainDetector};
pub use partition::Partition;
pub use summarizer::{CommunitySummarizer, CommunitySummary};
