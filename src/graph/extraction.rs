//! Graph store → petgraph extraction.
//!
//! Converts the stored similarity graph into an in-memory
//! `petgraph::UnGraph` for connectivity analysis. Uses the `GraphStore`
//! trait (not raw Cypher) and a single bulk query: the propagation snapshot
//! already lists every node exactly once with its full neighbour set.

use crate::models::Attribute;
use crate::neo4j::{GraphStore, LabeledNeighbors};
use anyhow::Result;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;
use std::sync::Arc;

/// Undirected protein graph with an id → node index lookup.
#[derive(Debug, Default)]
pub struct ProteinGraph {
    pub graph: UnGraph<String, ()>,
    pub index: HashMap<String, NodeIndex>,
}

impl ProteinGraph {
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: UnGraph::with_capacity(nodes, edges),
            index: HashMap::with_capacity(nodes),
        }
    }

    /// Add a node if it is not already present.
    pub fn add_node(&mut self, protein_id: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(protein_id) {
            return idx;
        }
        let idx = self.graph.add_node(protein_id.to_string());
        self.index.insert(protein_id.to_string(), idx);
        idx
    }

    /// Add an undirected edge once; self-loops are ignored.
    pub fn add_edge(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        let ia = self.add_node(a);
        let ib = self.add_node(b);
        if self.graph.find_edge(ia, ib).is_none() {
            self.graph.add_edge(ia, ib, ());
        }
    }

    /// Build from a neighbour snapshot.
    pub fn from_snapshot(snapshot: &[LabeledNeighbors]) -> Self {
        let edge_hint: usize = snapshot.iter().map(|n| n.neighbor_ids.len()).sum::<usize>() / 2;
        let mut graph = Self::with_capacity(snapshot.len(), edge_hint);
        for node in snapshot {
            graph.add_node(&node.protein_id);
        }
        for node in snapshot {
            for neighbor in &node.neighbor_ids {
                graph.add_edge(&node.protein_id, neighbor);
            }
        }
        graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Extracts the similarity graph from the graph store.
pub struct GraphExtractor {
    store: Arc<dyn GraphStore>,
}

impl GraphExtractor {
    /// Create a new extractor backed by the given GraphStore.
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Fetch every node with its neighbours and build the undirected graph.
    pub async fn extract(&self) -> Result<ProteinGraph> {
        // Labels are irrelevant here; any attribute yields the same topology.
        let snapshot = self.store.neighbors_with_labels(Attribute::Ec).await?;
        let graph = ProteinGraph::from_snapshot(&snapshot);
        tracing::debug!(
            "Extracted similarity graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}
