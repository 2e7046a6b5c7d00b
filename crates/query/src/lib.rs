//! Retrieval over a built knowledge base.
//!
//! Two search strategies run against the same snapshot: [`LocalSearch`]
//! reaches chunks through the entities that anchor them, [`GlobalSearch`]
//! compares the query to community summaries. [`HybridRanker`] fuses the
//! two score lists into one ordering, and [`answer`] turns the fused
//! ranking into a citation-tagged prompt.

pub mod answer;
pub mod global_search;
pub mod local_search;
pub mod mode;
pub mod ranker;

pub use answer::{build_answer_prompt, select_evidence};
pub use global_search::{GlobalSearch, GlobalSearchConfig};
pub use local_search::{LocalSearch, LocalSearchConfig};
pub use mode::Mode;
pub use ranker::{HybridConfig, HybridRanker};

use serde::{Deserialize, Serialize};

/// An id paired with its retrieval score. Local search scores chunks,
/// global search scores communities; the ranker treats the ids as opaque
/// integers and the caller keeps the two interpretations apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scored {
    pub id: usize,
    pub score: f32,
}

impl Scored {
    pub fn new(id: usize, score: f32) -> Self {
        Self { id, score }
    }
}
