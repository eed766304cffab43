//! GraphStore trait definition
//!
//! Abstract interface over the protein similarity graph. Mirrors the public
//! async methods of `Neo4jClient`, enabling testing with the in-memory mock.

use crate::graph::models::SimilarityEdge;
use crate::models::Attribute;
use crate::neo4j::models::*;
use anyhow::Result;
use async_trait::async_trait;

/// Abstract interface for all graph database operations.
#[async_trait]
pub trait GraphStore: Send + Sync {
    // ========================================================================
    // Build operations
    // ========================================================================

    /// Delete every node and relationship
    async fn clear(&self) -> Result<()>;

    /// Create or update a protein node (keyed by protein_id)
    async fn upsert_node(&self, node: &ProteinNode) -> Result<()>;

    /// Create or update the undirected similarity edge between two proteins.
    /// Returns false when either endpoint is missing.
    async fn upsert_edge(&self, edge: &SimilarityEdge) -> Result<bool>;

    // ========================================================================
    // Propagation operations
    // ========================================================================

    /// Every node exactly once with its labels for `attribute` and its full
    /// undirected neighbour set
    async fn neighbors_with_labels(&self, attribute: Attribute) -> Result<Vec<LabeledNeighbors>>;

    /// Replace a node's labels for `attribute`. Returns false if the node is unknown.
    async fn set_labels(&self, protein_id: &str, labels: &[String], attribute: Attribute)
        -> Result<bool>;

    // ========================================================================
    // Query operations
    // ========================================================================

    /// Node/edge counts and degree summary
    async fn graph_totals(&self) -> Result<GraphTotals>;

    /// Nodes and edges within `depth` hops of a protein
    async fn neighborhood(&self, protein_id: &str, depth: usize) -> Result<GraphData>;

    /// Case-insensitive substring match on protein id or name
    async fn search_proteins(&self, query: &str, limit: usize) -> Result<Vec<ProteinNode>>;
}
