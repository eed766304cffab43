//! Synchronous label propagation.
//!
//! Every iteration computes the whole next assignment from the previous
//! snapshot (Jacobi style); no update ever observes a partially updated
//! iteration. Under [`UpdatePolicy::Union`] a protein with neighbours takes
//! the union of their current label sets; a protein without neighbours, or
//! whose neighbours hold no labels, keeps its own set.
//!
//! The run stops as soon as the fraction of changed proteins drops below the
//! threshold (reported as converged), or after `max_iterations`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::models::{IterationStats, PropagationOutcome, PropagationParams, UpdatePolicy};
use crate::neo4j::LabeledNeighbors;

type LabelSet = BTreeSet<String>;

/// Index-based adjacency with seed labels, built once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelGraph {
    ids: Vec<String>,
    seeds: Vec<LabelSet>,
    neighbors: Vec<Vec<usize>>,
}

impl LabelGraph {
    /// Build from a store snapshot.
    ///
    /// Duplicate protein ids keep their first occurrence; neighbour ids that
    /// are not in the snapshot and self-references are ignored.
    pub fn from_snapshot(snapshot: &[LabeledNeighbors]) -> Self {
        let mut position: HashMap<&str, usize> = HashMap::with_capacity(snapshot.len());
        let mut entries: Vec<&LabeledNeighbors> = Vec::with_capacity(snapshot.len());
        for node in snapshot {
            if !position.contains_key(node.protein_id.as_str()) {
                position.insert(node.protein_id.as_str(), entries.len());
                entries.push(node);
            }
        }

        let mut dangling = 0usize;
        let neighbors = entries
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let mut adj: Vec<usize> = node
                    .neighbor_ids
                    .iter()
                    .filter_map(|n| match position.get(n.as_str()) {
                        Some(&j) => Some(j),
                        None => {
                            dangling += 1;
                            None
                        }
                    })
                    .filter(|&j| j != i)
                    .collect();
                adj.sort_unstable();
                adj.dedup();
                adj
            })
            .collect();
        if dangling > 0 {
            tracing::debug!("Ignored {} neighbour references to unknown proteins", dangling);
        }

        Self {
            ids: entries.iter().map(|n| n.protein_id.clone()).collect(),
            seeds: entries
                .iter()
                .map(|n| n.labels.iter().cloned().collect())
                .collect(),
            neighbors,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Seed labels keyed by protein id.
    pub fn seeds(&self) -> BTreeMap<String, LabelSet> {
        self.ids
            .iter()
            .cloned()
            .zip(self.seeds.iter().cloned())
            .collect()
    }

    /// Indices of proteins whose seed set is non-empty.
    pub fn seeded_indices(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| !self.seeds[i].is_empty()).collect()
    }

    pub fn seed_at(&self, index: usize) -> &LabelSet {
        &self.seeds[index]
    }

    pub fn id_at(&self, index: usize) -> &str {
        &self.ids[index]
    }

    /// Copy of this graph with the seed labels of `indices` cleared.
    pub fn masked(&self, indices: &[usize]) -> Self {
        let mut copy = self.clone();
        for &i in indices {
            if let Some(seed) = copy.seeds.get_mut(i) {
                seed.clear();
            }
        }
        copy
    }

    /// One synchronous update computed entirely from `current`.
    fn step(&self, current: &[LabelSet], policy: UpdatePolicy) -> Vec<LabelSet> {
        self.neighbors
            .iter()
            .enumerate()
            .map(|(i, adj)| {
                if adj.is_empty() {
                    return current[i].clone();
                }
                let mut tally: BTreeMap<&str, usize> = BTreeMap::new();
                for &j in adj {
                    for label in &current[j] {
                        *tally.entry(label.as_str()).or_insert(0) += 1;
                    }
                }
                if tally.is_empty() {
                    return current[i].clone();
                }
                match policy {
                    UpdatePolicy::Union => tally.keys().map(|l| l.to_string()).collect(),
                    UpdatePolicy::Majority => {
                        let best = tally.values().copied().max().unwrap_or(0);
                        tally
                            .into_iter()
                            .filter(|&(_, count)| count == best)
                            .map(|(label, _)| label.to_string())
                            .collect()
                    }
                }
            })
            .collect()
    }
}

/// Run propagation from the graph's seed labels.
pub fn propagate(graph: &LabelGraph, params: &PropagationParams) -> PropagationOutcome {
    let n = graph.len();
    let mut current: Vec<LabelSet> = graph.seeds.clone();
    let mut trace = Vec::new();

    if n == 0 {
        return PropagationOutcome {
            labels: BTreeMap::new(),
            iterations_completed: 0,
            converged: true,
            trace,
        };
    }

    let mut converged = false;
    let mut iterations_completed = params.max_iterations;

    for iteration in 1..=params.max_iterations {
        let next = graph.step(&current, params.policy);
        let changed = next
            .iter()
            .zip(current.iter())
            .filter(|(new, old)| new != old)
            .count();
        let convergence_rate = changed as f64 / n as f64;
        trace.push(IterationStats {
            iteration,
            changed,
            convergence_rate,
        });
        tracing::debug!(
            "Propagation iteration {}: {} changed (rate {:.4})",
            iteration,
            changed,
            convergence_rate
        );

        current = next;
        if convergence_rate < params.threshold {
            converged = true;
            iterations_completed = iteration;
            break;
        }
    }

    PropagationOutcome {
        labels: graph.ids.iter().cloned().zip(current).collect(),
        iterations_completed,
        converged,
        trace,
    }
}
