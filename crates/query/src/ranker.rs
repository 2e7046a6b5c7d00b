use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Scored;

fn default_alpha() -> f32 {
    0.6
}

fn default_final_top_k() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridConfig {
    /// Weight of the local (chunk) list in the fused score; the global
    /// (community) list gets `1 - alpha`.
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    /// How many fused ids the caller keeps when assembling answer context.
    /// The ranker itself never truncates.
    #[serde(default = "default_final_top_k")]
    pub final_top_k: usize,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            final_top_k: default_final_top_k(),
        }
    }
}

/// Fuses local and global score lists into a single ranking.
///
/// Each list is min-max normalized on its own, then every id in the union
/// scores `alpha * local + (1 - alpha) * global`, the side an id is
/// missing from counting as zero.
pub struct HybridRanker {
    config: HybridConfig,
}

impl HybridRanker {
    pub fn new(config: HybridConfig) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&config.alpha),
            "alpha must lie in [0, 1]"
        );
        Self { config }
    }

    /// Rank the union of both id lists by fused score, descending. The
    /// full union comes back; `sort_by` is stable, so equal fused scores
    /// keep first-appearance order (local ids first, then global-only
    /// ids).
    pub fn rank(&self, local: &[Scored], global: &[Scored]) -> Vec<Scored> {
        let local_norm = min_max_normalize(local);
        let global_norm = min_max_normalize(global);

        let mut seen = HashSet::new();
        let mut fused: Vec<Scored> = local
            .iter()
            .chain(global)
            .filter(|s| seen.insert(s.id))
            .map(|s| {
                let l = local_norm.get(&s.id).copied().unwrap_or(0.0);
                let g = global_norm.get(&s.id).copied().unwrap_or(0.0);
                Scored::new(s.id, self.config.alpha * l + (1.0 - self.config.alpha) * g)
            })
            .collect();

        fused.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!(
            local = local.len(),
            global = global.len(),
            fused = fused.len(),
            "hybrid ranking complete"
        );
        fused
    }
}

/// Min-max normalize a score list into `[0, 1]`, keyed by id. An empty
/// list normalizes to an empty map and contributes nothing to the fusion;
/// a list where every score is equal maps each of its ids to 1.0. A
/// repeated id keeps its last score.
fn min_max_normalize(scores: &[Scored]) -> HashMap<usize, f32> {
    if scores.is_empty() {
        return HashMap::new();
    }

    let mut by_id: HashMap<usize, f32> = HashMap::with_capacity(scores.len());
    for s in scores {
        by_id.insert(s.id, s.score);
    }

    let min = by_id.values().copied().fold(f32::INFINITY, f32::min);
    let max = by_id.values().copied().fold(f32::NEG_INFINITY, f32::max);

    if max == min {
        return by_id.into_keys().map(|id| (id, 1.0)).collect();
    }

    let range = max - min;
    by_id
        .into_iter()
        .map(|(id, score)| (id, (score - min) / range))
        .collect()
}
