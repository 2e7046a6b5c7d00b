pub mod builder;
pub mod export;
pub mod knowledge;
pub mod types;

pub use builder::{CO_OCCURS, GraphBuilder};
pub use export::{GraphExport, RelationExport};
pub use knowledge::KnowledgeGraph;
pub use types::{EntityNode, RelationEdge};
