//! In-memory mock implementation of GraphStore.
//!
//! Backs nodes and relationships with `tokio::sync::RwLock<HashMap<K, V>>`
//! collections. Used by unit and integration tests and by the CLI's
//! `--offline` mode.

use crate::graph::models::{PairKey, SimilarityEdge};
use crate::models::{Attribute, ProteinStatus};
use crate::neo4j::models::*;
use crate::neo4j::traits::GraphStore;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tokio::sync::RwLock;

/// In-memory mock implementation of GraphStore.
#[derive(Default)]
pub struct MockGraphStore {
    pub nodes: RwLock<HashMap<String, ProteinNode>>,
    pub edges: RwLock<HashMap<PairKey, SimilarityRel>>,
    /// Protein ids whose `set_labels` call fails (failure injection)
    pub failing_writes: RwLock<HashSet<String>>,
}

impl MockGraphStore {
    /// Create a new empty MockGraphStore.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Builder / seeding methods for tests
    // ========================================================================

    /// Seed a bare node with labels for `attribute`.
    pub async fn with_labeled_node(self, protein_id: &str, attribute: Attribute, labels: &[&str]) -> Self {
        let mut node = ProteinNode {
            protein_id: protein_id.to_string(),
            name: None,
            status: ProteinStatus::Unreviewed,
            ec_numbers: Vec::new(),
            go_terms: Vec::new(),
            domain_count: 0,
            taxonomy_id: None,
        };
        node.set_labels(attribute, labels.iter().map(|l| l.to_string()).collect());
        self.nodes.write().await.insert(node.protein_id.clone(), node);
        self
    }

    /// Seed an undirected edge between two existing nodes.
    pub async fn with_edge(self, a: &str, b: &str, similarity: f64) -> Self {
        if let Some(key) = PairKey::new(a, b) {
            let rel = SimilarityRel {
                protein_a: key.first().to_string(),
                protein_b: key.second().to_string(),
                weight: similarity,
                jaccard_similarity: similarity,
                shared_domains: Vec::new(),
                shared_domain_count: 0,
            };
            self.edges.write().await.insert(key, rel);
        }
        self
    }

    /// Make `set_labels` fail for this protein.
    pub async fn with_failing_write(self, protein_id: &str) -> Self {
        self.failing_writes
            .write()
            .await
            .insert(protein_id.to_string());
        self
    }

    fn adjacency(edges: &HashMap<PairKey, SimilarityRel>) -> HashMap<&str, BTreeSet<&str>> {
        let mut adj: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        for key in edges.keys() {
            adj.entry(key.first()).or_default().insert(key.second());
            adj.entry(key.second()).or_default().insert(key.first());
        }
        adj
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    async fn clear(&self) -> Result<()> {
        self.nodes.write().await.clear();
        self.edges.write().await.clear();
        Ok(())
    }

    async fn upsert_node(&self, node: &ProteinNode) -> Result<()> {
        self.nodes
            .write()
            .await
            .insert(node.protein_id.clone(), node.clone());
        Ok(())
    }

    async fn upsert_edge(&self, edge: &SimilarityEdge) -> Result<bool> {
        let nodes = self.nodes.read().await;
        if !nodes.contains_key(&edge.protein_a) || !nodes.contains_key(&edge.protein_b) {
            return Ok(false);
        }
        let Some(key) = PairKey::new(&edge.protein_a, &edge.protein_b) else {
            return Ok(false);
        };
        self.edges
            .write()
            .await
            .insert(key, SimilarityRel::from(edge));
        Ok(true)
    }

    async fn neighbors_with_labels(&self, attribute: Attribute) -> Result<Vec<LabeledNeighbors>> {
        let nodes = self.nodes.read().await;
        let edges = self.edges.read().await;
        let adj = Self::adjacency(&edges);

        let mut out: Vec<LabeledNeighbors> = nodes
            .values()
            .map(|node| LabeledNeighbors {
                protein_id: node.protein_id.clone(),
                labels: node.labels(attribute).to_vec(),
                neighbor_ids: adj
                    .get(node.protein_id.as_str())
                    .map(|ns| ns.iter().map(|s| s.to_string()).collect())
                    .unwrap_or_default(),
            })
            .collect();
        out.sort_by(|a, b| a.protein_id.cmp(&b.protein_id));
        Ok(out)
    }

    async fn set_labels(
        &self,
        protein_id: &str,
        labels: &[String],
        attribute: Attribute,
    ) -> Result<bool> {
        if self.failing_writes.read().await.contains(protein_id) {
            return Err(anyhow!("injected write failure for {}", protein_id));
        }
        let mut nodes = self.nodes.write().await;
        match nodes.get_mut(protein_id) {
            Some(node) => {
                node.set_labels(attribute, labels.to_vec());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn graph_totals(&self) -> Result<GraphTotals> {
        let nodes = self.nodes.read().await;
        let edges = self.edges.read().await;
        let adj = Self::adjacency(&edges);

        let reviewed_count = nodes
            .values()
            .filter(|n| n.status == ProteinStatus::Reviewed)
            .count();
        let isolated_node_count = nodes
            .keys()
            .filter(|id| !adj.contains_key(id.as_str()))
            .count();

        Ok(GraphTotals {
            node_count: nodes.len(),
            edge_count: edges.len(),
            isolated_node_count,
            reviewed_count,
            unreviewed_count: nodes.len() - reviewed_count,
            average_degree: GraphTotals::degree_of(nodes.len(), edges.len()),
            clustering_coefficient: None,
        })
    }

    async fn neighborhood(&self, protein_id: &str, depth: usize) -> Result<GraphData> {
        let depth = depth.clamp(1, 3);
        let nodes = self.nodes.read().await;
        if !nodes.contains_key(protein_id) {
            return Ok(GraphData::default());
        }
        let edges = self.edges.read().await;
        let adj = Self::adjacency(&edges);

        let mut reached: BTreeSet<&str> = BTreeSet::new();
        let mut queue = VecDeque::from([(protein_id, 0usize)]);
        reached.insert(protein_id);
        while let Some((current, hops)) = queue.pop_front() {
            if hops == depth {
                continue;
            }
            for &next in adj.get(current).into_iter().flatten() {
                if reached.insert(next) {
                    queue.push_back((next, hops + 1));
                }
            }
        }

        let mut rels: Vec<SimilarityRel> = edges
            .iter()
            .filter(|(k, _)| reached.contains(k.first()) && reached.contains(k.second()))
            .map(|(_, rel)| rel.clone())
            .collect();
        rels.sort_by(|a, b| (&a.protein_a, &a.protein_b).cmp(&(&b.protein_a, &b.protein_b)));

        Ok(GraphData {
            nodes: reached.iter().filter_map(|id| nodes.get(*id).cloned()).collect(),
            edges: rels,
        })
    }

    async fn search_proteins(&self, query: &str, limit: usize) -> Result<Vec<ProteinNode>> {
        let needle = query.to_lowercase();
        let mut hits: Vec<ProteinNode> = self
            .nodes
            .read()
            .await
            .values()
            .filter(|n| {
                n.protein_id.to_lowercase().contains(&needle)
                    || n.name
                        .as_deref()
                        .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.protein_id.cmp(&b.protein_id));
        hits.truncate(limit);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn make_chain() -> MockGraphStore {
        MockGraphStore::new()
            .with_labeled_node("A", Attribute::Ec, &["1.1.1.1"])
            .await
            .with_labeled_node("B", Attribute::Ec, &[])
            .await
            .with_labeled_node("C", Attribute::Ec, &["2.2.2.2"])
            .await
            .with_edge("B", "A", 0.5)
            .await
            .with_edge("B", "C", 0.5)
            .await
    }

    #[tokio::test]
    async fn test_neighbors_are_undirected() {
        let store = make_chain().await;
        let snapshot = store.neighbors_with_labels(Attribute::Ec).await.unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].neighbor_ids, vec!["B".to_string()]);
        assert_eq!(snapshot[1].neighbor_ids, vec!["A".to_string(), "C".to_string()]);
        assert_eq!(snapshot[2].labels, vec!["2.2.2.2".to_string()]);
    }

    #[tokio::test]
    async fn test_set_labels_unknown_node() {
        let store = make_chain().await;
        assert!(!store
            .set_labels("Z", &["x".into()], Attribute::Go)
            .await
            .unwrap());
        assert!(store
            .set_labels("B", &["GO:1".into()], Attribute::Go)
            .await
            .unwrap());
        assert_eq!(store.nodes.read().await["B"].go_terms, vec!["GO:1".to_string()]);
    }

    #[tokio::test]
    async fn test_totals_and_neighborhood() {
        let store = make_chain()
            .await
            .with_labeled_node("D", Attribute::Ec, &[])
            .await;
        let totals = store.graph_totals().await.unwrap();
        assert_eq!(totals.node_count, 4);
        assert_eq!(totals.edge_count, 2);
        assert_eq!(totals.isolated_node_count, 1);
        assert!((totals.average_degree - 1.0).abs() < 1e-12);

        let one_hop = store.neighborhood("A", 1).await.unwrap();
        assert_eq!(one_hop.nodes.len(), 2);
        assert_eq!(one_hop.edges.len(), 1);

        let two_hops = store.neighborhood("A", 2).await.unwrap();
        assert_eq!(two_hops.nodes.len(), 3);
        assert_eq!(two_hops.edges.len(), 2);

        assert!(store.neighborhood("missing", 1).await.unwrap().nodes.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_edge_requires_endpoints() {
        let store = make_chain().await;
        let edge = SimilarityEdge {
            protein_a: "A".into(),
            protein_b: "Z".into(),
            shared_domains: ["d1".to_string()].into_iter().collect(),
            jaccard_similarity: 1.0,
        };
        assert!(!store.upsert_edge(&edge).await.unwrap());
        assert_eq!(store.edges.read().await.len(), 2);
    }
}
