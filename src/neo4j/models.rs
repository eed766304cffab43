//! Neo4j graph models: protein nodes, similarity edges and graph totals

use crate::graph::models::SimilarityEdge;
use crate::models::{Attribute, ProteinProjection, ProteinStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Protein Node
// ============================================================================

/// A `:Protein` node with its denormalised label and domain attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinNode {
    pub protein_id: String,
    pub name: Option<String>,
    pub status: ProteinStatus,
    pub ec_numbers: Vec<String>,
    pub go_terms: Vec<String>,
    pub domain_count: usize,
    pub taxonomy_id: Option<String>,
}

impl ProteinNode {
    pub fn labels(&self, attribute: Attribute) -> &[String] {
        match attribute {
            Attribute::Ec => &self.ec_numbers,
            Attribute::Go => &self.go_terms,
        }
    }

    pub fn set_labels(&mut self, attribute: Attribute, labels: Vec<String>) {
        match attribute {
            Attribute::Ec => self.ec_numbers = labels,
            Attribute::Go => self.go_terms = labels,
        }
    }
}

impl From<&ProteinProjection> for ProteinNode {
    fn from(p: &ProteinProjection) -> Self {
        let domain_count = p.domain_ids.iter().collect::<BTreeSet<_>>().len();
        Self {
            protein_id: p.protein_id.clone(),
            name: p.name.clone(),
            status: p.status,
            ec_numbers: p.ec_numbers.clone(),
            go_terms: p.go_terms.clone(),
            domain_count,
            taxonomy_id: p.taxonomy_id.clone(),
        }
    }
}

// ============================================================================
// Similarity Relationship
// ============================================================================

/// A `SIMILAR_TO` relationship as read back from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRel {
    pub protein_a: String,
    pub protein_b: String,
    pub weight: f64,
    pub jaccard_similarity: f64,
    pub shared_domains: Vec<String>,
    pub shared_domain_count: usize,
}

impl From<&SimilarityEdge> for SimilarityRel {
    fn from(e: &SimilarityEdge) -> Self {
        Self {
            protein_a: e.protein_a.clone(),
            protein_b: e.protein_b.clone(),
            weight: e.weight(),
            jaccard_similarity: e.jaccard_similarity,
            shared_domains: e.shared_domains.iter().cloned().collect(),
            shared_domain_count: e.shared_domain_count(),
        }
    }
}

/// Nodes and relationships of a subgraph (neighbourhood queries)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<ProteinNode>,
    pub edges: Vec<SimilarityRel>,
}

// ============================================================================
// Propagation snapshot
// ============================================================================

/// One node's labels and its full undirected neighbour set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledNeighbors {
    pub protein_id: String,
    pub labels: Vec<String>,
    pub neighbor_ids: Vec<String>,
}

impl LabeledNeighbors {
    pub fn new<L, N>(protein_id: impl Into<String>, labels: L, neighbor_ids: N) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        Self {
            protein_id: protein_id.into(),
            labels: labels.into_iter().map(Into::into).collect(),
            neighbor_ids: neighbor_ids.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Totals
// ============================================================================

/// Raw counts reported by the graph store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphTotals {
    pub node_count: usize,
    pub edge_count: usize,
    pub isolated_node_count: usize,
    pub reviewed_count: usize,
    pub unreviewed_count: usize,
    pub average_degree: f64,
    /// Only available when the store can compute it (e.g. Neo4j GDS)
    pub clustering_coefficient: Option<f64>,
}

impl GraphTotals {
    /// `2E / N`, or 0 for an empty graph.
    pub fn degree_of(node_count: usize, edge_count: usize) -> f64 {
        if node_count == 0 {
            0.0
        } else {
            2.0 * edge_count as f64 / node_count as f64
        }
    }
}
