//! Similarity graph data models.
//!
//! ## Input types (extraction)
//! - [`DomainProfile`]: one protein's id and domain set, the unit of comparison
//! - [`DomainIndex`]: inverted index domain → proteins containing it
//!
//! ## Output types (similarity)
//! - [`PairKey`]: canonical unordered protein pair
//! - [`SimilarityEdge`]: a thresholded Jaccard edge
//! - [`BuildReport`]: summary of a full graph rebuild
//!
//! ## Queries
//! - [`SimilarProtein`], [`DomainDistribution`], [`ConnectivityReport`],
//!   [`GraphStatistics`]

use crate::error::AnnotationError;
use crate::models::{ProteinProjection, WriteTally};
use crate::neo4j::models::GraphTotals;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// ============================================================================
// Input types: snapshot and inverted index
// ============================================================================

/// A protein's id and its (deduplicated) domain set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainProfile {
    pub protein_id: String,
    pub domains: BTreeSet<String>,
}

impl DomainProfile {
    pub fn new<I, S>(protein_id: impl Into<String>, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protein_id: protein_id.into(),
            domains: domains.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&ProteinProjection> for DomainProfile {
    fn from(p: &ProteinProjection) -> Self {
        Self::new(p.protein_id.clone(), p.domain_ids.iter().cloned())
    }
}

/// Inverted index mapping each domain to the proteins that contain it.
///
/// Buckets are kept in first-seen domain order and each bucket lists proteins
/// in input order, so edge enumeration is deterministic for a given input.
#[derive(Debug, Clone, Default)]
pub struct DomainIndex {
    buckets: Vec<(String, Vec<String>)>,
    positions: HashMap<String, usize>,
}

impl DomainIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `protein_id` to the bucket of `domain`, creating it if needed.
    pub fn insert(&mut self, domain: &str, protein_id: &str) {
        match self.positions.get(domain) {
            Some(&pos) => self.buckets[pos].1.push(protein_id.to_string()),
            None => {
                self.positions
                    .insert(domain.to_string(), self.buckets.len());
                self.buckets
                    .push((domain.to_string(), vec![protein_id.to_string()]));
            }
        }
    }

    /// Proteins containing `domain` (empty slice when unknown).
    pub fn proteins(&self, domain: &str) -> &[String] {
        self.positions
            .get(domain)
            .map(|&pos| self.buckets[pos].1.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate `(domain, proteins)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.buckets
            .iter()
            .map(|(d, ps)| (d.as_str(), ps.as_slice()))
    }

    /// Number of distinct domains.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Upper bound on candidate pairs: Σ k·(k−1)/2 over buckets.
    pub fn pair_budget(&self) -> usize {
        self.buckets
            .iter()
            .map(|(_, ps)| ps.len() * ps.len().saturating_sub(1) / 2)
            .sum()
    }
}

// ============================================================================
// Output types: pairs and edges
// ============================================================================

/// Canonical key for an unordered protein pair: `first < second`.
///
/// Ordering is lexicographic on the protein id, which makes `(a, b)` and
/// `(b, a)` collapse to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    /// Build the canonical key. Returns `None` for a self-pair.
    pub fn new(a: &str, b: &str) -> Option<Self> {
        match a.cmp(b) {
            std::cmp::Ordering::Less => Some(Self {
                first: a.to_string(),
                second: b.to_string(),
            }),
            std::cmp::Ordering::Greater => Some(Self {
                first: b.to_string(),
                second: a.to_string(),
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }
}

/// A Jaccard similarity edge between two proteins.
///
/// Invariants: `protein_a < protein_b`, `shared_domains` non-empty and a
/// subset of both endpoints' domain sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEdge {
    pub protein_a: String,
    pub protein_b: String,
    pub shared_domains: BTreeSet<String>,
    pub jaccard_similarity: f64,
}

impl SimilarityEdge {
    /// Edge weight as stored in the graph (the Jaccard similarity).
    pub fn weight(&self) -> f64 {
        self.jaccard_similarity
    }

    pub fn shared_domain_count(&self) -> usize {
        self.shared_domains.len()
    }

    pub fn key(&self) -> PairKey {
        PairKey {
            first: self.protein_a.clone(),
            second: self.protein_b.clone(),
        }
    }
}

// ============================================================================
// Requests and reports
// ============================================================================

/// Parameters of a full graph rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildGraphRequest {
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,
    #[serde(default)]
    pub max_proteins: Option<usize>,
}

pub(crate) fn default_min_similarity() -> f64 {
    0.1
}

impl Default for BuildGraphRequest {
    fn default() -> Self {
        Self {
            min_similarity: default_min_similarity(),
            max_proteins: None,
        }
    }
}

impl BuildGraphRequest {
    pub fn validate(&self) -> Result<(), AnnotationError> {
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(AnnotationError::InvalidParameter {
                name: "min_similarity",
                value: self.min_similarity.to_string(),
                reason: "must be within [0, 1]",
            });
        }
        if self.max_proteins == Some(0) {
            return Err(AnnotationError::InvalidParameter {
                name: "max_proteins",
                value: "0".into(),
                reason: "must be a positive integer",
            });
        }
        Ok(())
    }
}

/// Summary of a graph rebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    pub protein_count: usize,
    pub unique_domains: usize,
    pub candidate_pairs: usize,
    pub edge_count: usize,
    pub min_similarity: f64,
    pub nodes: WriteTally,
    pub edges: WriteTally,
    pub computation_ms: u64,
}

/// A protein ranked by similarity against a query protein.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarProtein {
    pub protein_id: String,
    pub name: Option<String>,
    pub similarity: f64,
    pub shared_domains: Vec<String>,
}

/// Domain frequency and per-protein domain count summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainDistribution {
    pub total_unique_domains: usize,
    /// Up to 20 `(domain, protein_count)` pairs, most common first.
    pub most_common_domains: Vec<(String, usize)>,
    pub average_domains_per_protein: f64,
    pub median_domains_per_protein: f64,
    pub max_domains_per_protein: usize,
    pub min_domains_per_protein: usize,
    pub proteins_with_no_domains: usize,
}

/// Undirected connectivity of the similarity graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityReport {
    pub component_count: usize,
    pub largest_component_size: usize,
    /// Mean local clustering coefficient (None on an empty graph).
    pub average_clustering: Option<f64>,
}

/// Graph store totals with derived ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub totals: GraphTotals,
    pub density: f64,
    pub reviewed_percentage: f64,
    pub unreviewed_percentage: f64,
    pub isolated_percentage: f64,
    pub connectivity: ConnectivityReport,
}

impl GraphStatistics {
    pub fn from_totals(totals: GraphTotals, connectivity: ConnectivityReport) -> Self {
        let n = totals.node_count as f64;
        let pct = |count: usize| {
            if totals.node_count > 0 {
                count as f64 / n * 100.0
            } else {
                0.0
            }
        };
        let density = if totals.node_count > 1 {
            2.0 * totals.edge_count as f64 / (n * (n - 1.0))
        } else {
            0.0
        };
        Self {
            density,
            reviewed_percentage: pct(totals.reviewed_count),
            unreviewed_percentage: pct(totals.unreviewed_count),
            isolated_percentage: pct(totals.isolated_node_count),
            connectivity,
            totals,
        }
    }
}
