//! Similarity graph writer.
//!
//! Replaces the stored graph wholesale: clear, then upsert every node and
//! every edge. Individual upsert failures are tallied and skipped; only the
//! clear is fatal. Not safe to run concurrently against the same store.

use crate::models::WriteTally;
use crate::neo4j::{GraphStore, ProteinNode};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;

use super::models::SimilarityEdge;

/// Writes a computed similarity graph to the graph store.
pub struct GraphWriter {
    store: Arc<dyn GraphStore>,
}

impl GraphWriter {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Clear the store and repopulate it. Returns `(node_tally, edge_tally)`.
    pub async fn rebuild(
        &self,
        nodes: &[ProteinNode],
        edges: &[SimilarityEdge],
    ) -> Result<(WriteTally, WriteTally)> {
        self.store
            .clear()
            .await
            .context("Failed to clear graph store before rebuild")?;

        let mut node_tally = WriteTally::default();
        for node in nodes {
            match self.store.upsert_node(node).await {
                Ok(()) => node_tally.record_success(),
                Err(e) => node_tally.record_failure(&node.protein_id, &e),
            }
        }

        let mut edge_tally = WriteTally::default();
        for edge in edges {
            let label = format!("{}-{}", edge.protein_a, edge.protein_b);
            match self.store.upsert_edge(edge).await {
                Ok(true) => edge_tally.record_success(),
                Ok(false) => edge_tally.record_failure(&label, &anyhow!("endpoint node missing")),
                Err(e) => edge_tally.record_failure(&label, &e),
            }
        }

        tracing::info!(
            "Graph written: {}/{} nodes, {}/{} edges",
            node_tally.succeeded,
            node_tally.total(),
            edge_tally.succeeded,
            edge_tally.total()
        );
        Ok((node_tally, edge_tally))
    }
}
