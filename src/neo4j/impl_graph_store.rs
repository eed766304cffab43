//! `GraphStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;

use super::client::Neo4jClient;
use super::models::*;
use super::traits::GraphStore;
use crate::graph::models::SimilarityEdge;
use crate::models::Attribute;

#[async_trait]
impl GraphStore for Neo4jClient {
    // ========================================================================
    // Build operations
    // ========================================================================

    async fn clear(&self) -> anyhow::Result<()> {
        self.clear().await
    }

    async fn upsert_node(&self, node: &ProteinNode) -> anyhow::Result<()> {
        self.upsert_node(node).await
    }

    async fn upsert_edge(&self, edge: &SimilarityEdge) -> anyhow::Result<bool> {
        self.upsert_edge(edge).await
    }

    // ========================================================================
    // Propagation operations
    // ========================================================================

    async fn neighbors_with_labels(
        &self,
        attribute: Attribute,
    ) -> anyhow::Result<Vec<LabeledNeighbors>> {
        self.neighbors_with_labels(attribute).await
    }

    async fn set_labels(
        &self,
        protein_id: &str,
        labels: &[String],
        attribute: Attribute,
    ) -> anyhow::Result<bool> {
        self.set_labels(protein_id, labels, attribute).await
    }

    // ========================================================================
    // Query operations
    // ========================================================================

    async fn graph_totals(&self) -> anyhow::Result<GraphTotals> {
        self.graph_totals().await
    }

    async fn neighborhood(&self, protein_id: &str, depth: usize) -> anyhow::Result<GraphData> {
        self.neighborhood(protein_id, depth).await
    }

    async fn search_proteins(&self, query: &str, limit: usize) -> anyhow::Result<Vec<ProteinNode>> {
        self.search_proteins(query, limit).await
    }
}
