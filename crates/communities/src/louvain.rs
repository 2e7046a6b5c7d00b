use std::collections::{BTreeMap, HashMap};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use graph::KnowledgeGraph;

use crate::partition::Partition;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LouvainConfig {
    /// Upper bound on coarsening levels.
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
    /// Minimum modularity gain required to move a node. Damps oscillation
    /// between equally good communities.
    #[serde(default = "default_min_gain")]
    pub min_gain: f64,
    /// Fixed shuffle seed. `None` visits nodes in a random order each run.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_max_passes() -> usize {
    10
}

fn default_min_gain() -> f64 {
    1e-7
}

impl Default for LouvainConfig {
    fn default() -> Self {
        Self {
            max_passes: default_max_passes(),
            min_gain: default_min_gain(),
            seed: None,
        }
    }
}

/// Weighted Louvain community detection.
///
/// Runs the usual two phases per level: greedy local moving of nodes between
/// neighbouring communities while modularity improves, then coarsening the
/// graph with one super-node per community. Stops when a level produces no
/// merge or `max_passes` levels are reached.
pub struct LouvainDetector {
    config: LouvainConfig,
}

impl LouvainDetector {
    pub fn new(config: LouvainConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, graph: &KnowledgeGraph) -> Partition {
        self.detect_edges(graph.entity_count(), &graph.edge_list())
    }

    /// Detect communities on a raw weighted edge list over dense node
    /// indices `0..node_count`.
    pub fn detect_edges(&self, node_count: usize, edges: &[(usize, usize, f64)]) -> Partition {
        if node_count == 0 {
            return Partition::new(Vec::new(), 0);
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut level = Level::from_edges(node_count, edges);
        let mut node_to_comm: Vec<usize> = (0..node_count).collect();

        for pass in 0..self.config.max_passes {
            let (mut comm, moved) = self.local_moving(&level, &mut rng);
            let count = renumber(&mut comm);

            for c in node_to_comm.iter_mut() {
                *c = comm[*c];
            }

            if !moved || count == level.node_count() {
                debug!(pass, communities = count, "community detection converged");
                break;
            }

            level = level.coarsen(&comm, count);
        }

        // Final renumbering by original node order gives canonical ids
        // independent of the visiting order.
        let count = renumber(&mut node_to_comm);
        Partition::new(node_to_comm, count)
    }

    /// Phase one: sweep nodes in shuffled order, moving each to the
    /// neighbouring community with the highest modularity gain, until a full
    /// sweep moves nothing.
    fn local_moving(&self, level: &Level, rng: &mut StdRng) -> (Vec<usize>, bool) {
        let n = level.node_count();
        let degrees: Vec<f64> = (0..n).map(|u| level.degree(u)).collect();
        let two_m: f64 = degrees.iter().sum();

        let mut comm: Vec<usize> = (0..n).collect();
        if two_m == 0.0 {
            return (comm, false);
        }
        let mut tot = degrees.clone();

        let mut order: Vec<usize> = (0..n).collect();
        let mut moved_any = false;

        loop {
            let mut moved_this_sweep = false;
            order.shuffle(rng);

            for &u in &order {
                let ku = degrees[u];
                let current = comm[u];

                // Edge weight from u into each neighbouring community.
                // BTreeMap keeps candidate order deterministic under a seed.
                let mut to_comm: BTreeMap<usize, f64> = BTreeMap::new();
                for &(v, w) in &level.adj[u] {
                    *to_comm.entry(comm[v]).or_insert(0.0) += w;
                }

                tot[current] -= ku;
                let stay_gain =
                    to_comm.get(&current).copied().unwrap_or(0.0) - ku * tot[current] / two_m;

                let mut best_comm = current;
                let mut best_gain = stay_gain;
                for (&c, &w_uc) in &to_comm {
                    if c == current {
                        continue;
                    }
                    let gain = w_uc - ku * tot[c] / two_m;
                    if gain > best_gain + self.config.min_gain {
                        best_gain = gain;
                        best_comm = c;
                    }
                }

                tot[best_comm] += ku;
                if best_comm != current {
                    comm[u] = best_comm;
                    moved_this_sweep = true;
                    moved_any = true;
                }
            }

            if !moved_this_sweep {
                break;
            }
        }

        (comm, moved_any)
    }
}

/// One coarsening level: adjacency without self entries, plus accumulated
/// self-loop weight per node. A node's weighted degree counts its self-loop
/// twice, matching the internal weight it absorbed when coarsened.
struct Level {
    adj: Vec<Vec<(usize, f64)>>,
    self_w: Vec<f64>,
}

impl Level {
    fn from_edges(n: usize, edges: &[(usize, usize, f64)]) -> Self {
        let mut adj = vec![Vec::new(); n];
        let mut self_w = vec![0.0; n];
        for &(a, b, w) in edges {
            if a == b {
                self_w[a] += w;
            } else {
                adj[a].push((b, w));
                adj[b].push((a, w));
            }
        }
        Self { adj, self_w }
    }

    fn node_count(&self) -> usize {
        self.adj.len()
    }

    fn degree(&self, u: usize) -> f64 {
        self.adj[u].iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * self.self_w[u]
    }

    /// Phase two: one super-node per community. Intra-community weight
    /// becomes self-loop weight; inter-community edges are summed.
    fn coarsen(&self, comm: &[usize], count: usize) -> Level {
        let mut self_w = vec![0.0; count];
        let mut between: HashMap<(usize, usize), f64> = HashMap::new();

        for u in 0..self.node_count() {
            self_w[comm[u]] += self.self_w[u];
            for &(v, w) in &self.adj[u] {
                if u > v {
                    continue;
                }
                let (cu, cv) = (comm[u], comm[v]);
                if cu == cv {
                    self_w[cu] += w;
                } else {
                    let key = if cu < cv { (cu, cv) } else { (cv, cu) };
                    *between.entry(key).or_insert(0.0) += w;
                }
            }
        }

        let mut adj = vec![Vec::new(); count];
        for ((a, b), w) in between {
            adj[a].push((b, w));
            adj[b].push((a, w));
        }
        Level { adj, self_w }
    }
}

/// Remap community ids to `0..k` in order of first appearance. Returns `k`.
fn renumber(comm: &mut [usize]) -> usize {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    for c in comm.iter_mut() {
        let next = mapping.len();
        let id = *mapping.entry(*c).or_insert(next);
        *c = id;
    }
    mapping.len()
}
