//! Similarity graph engine: orchestrates graph construction and queries.
//!
//! 1. **Snapshot**: protein projections from the `DocumentStore`
//! 2. **Computation**: inverted index → thresholded Jaccard edges
//! 3. **Persistence**: full rebuild of the `GraphStore` via `GraphWriter`
//!
//! Query helpers (matrix, top-k, distribution, statistics) read from the
//! same stores without writing.

use crate::meilisearch::DocumentStore;
use crate::neo4j::{GraphStore, ProteinNode};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use super::algorithms::{
    build_domain_index, compute_similarities, domain_distribution, prepare_profiles, rank_similar,
    similarity_matrix,
};
use super::extraction::GraphExtractor;
use super::models::{
    BuildGraphRequest, BuildReport, DomainDistribution, DomainProfile, GraphStatistics,
    SimilarProtein,
};
use super::topology::connectivity;
use super::writer::GraphWriter;

/// Builds and queries the protein similarity graph.
pub struct SimilarityGraphEngine {
    documents: Arc<dyn DocumentStore>,
    graph: Arc<dyn GraphStore>,
    extractor: GraphExtractor,
    writer: GraphWriter,
}

impl SimilarityGraphEngine {
    pub fn new(documents: Arc<dyn DocumentStore>, graph: Arc<dyn GraphStore>) -> Self {
        Self {
            documents,
            extractor: GraphExtractor::new(graph.clone()),
            writer: GraphWriter::new(graph.clone()),
            graph,
        }
    }

    /// Recompute all similarity edges and replace the stored graph.
    ///
    /// Destructive: the graph store is cleared first. Callers must not run
    /// two builds against the same store concurrently.
    pub async fn build_graph(&self, request: &BuildGraphRequest) -> Result<BuildReport> {
        request.validate()?;
        let started = Instant::now();

        let proteins = self
            .documents
            .list_proteins_projection(request.max_proteins)
            .await
            .context("Failed to fetch protein snapshot")?;
        let profiles = prepare_profiles(&proteins, request.max_proteins);
        tracing::info!("Building similarity graph over {} proteins", profiles.len());

        let index = build_domain_index(&profiles);
        tracing::info!(
            "Domain index: {} domains, at most {} candidate pairs",
            index.len(),
            index.pair_budget()
        );

        let computed = compute_similarities(&profiles, &index, request.min_similarity);
        tracing::info!(
            "Computed {} edges from {} candidate pairs (min_similarity={})",
            computed.edges.len(),
            computed.candidate_pairs,
            request.min_similarity
        );

        let kept: HashSet<&str> = profiles.iter().map(|p| p.protein_id.as_str()).collect();
        let mut seen = HashSet::new();
        let nodes: Vec<ProteinNode> = proteins
            .iter()
            .filter(|p| kept.contains(p.protein_id.as_str()) && seen.insert(p.protein_id.as_str()))
            .map(ProteinNode::from)
            .collect();

        let (node_tally, edge_tally) = self.writer.rebuild(&nodes, &computed.edges).await?;

        Ok(BuildReport {
            protein_count: profiles.len(),
            unique_domains: index.len(),
            candidate_pairs: computed.candidate_pairs,
            edge_count: computed.edges.len(),
            min_similarity: request.min_similarity,
            nodes: node_tally,
            edges: edge_tally,
            computation_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Pairwise Jaccard matrix for the listed proteins; unknown ids are skipped.
    pub async fn similarity_matrix(
        &self,
        protein_ids: &[String],
    ) -> Result<BTreeMap<String, BTreeMap<String, f64>>> {
        let mut profiles = Vec::with_capacity(protein_ids.len());
        for id in protein_ids {
            match self.documents.get_protein(id).await? {
                Some(record) => profiles.push(DomainProfile::new(id.clone(), record.domain_ids)),
                None => tracing::debug!("Skipping unknown protein {} in similarity matrix", id),
            }
        }
        Ok(similarity_matrix(&profiles))
    }

    /// The `top_k` proteins most similar to `protein_id` (empty if unknown).
    pub async fn find_similar(
        &self,
        protein_id: &str,
        top_k: usize,
        min_similarity: f64,
    ) -> Result<Vec<SimilarProtein>> {
        let Some(target) = self.documents.get_protein(protein_id).await? else {
            return Ok(Vec::new());
        };
        let target = DomainProfile::new(target.protein_id, target.domain_ids);
        let candidates = self.documents.list_proteins_projection(None).await?;
        Ok(rank_similar(&target, &candidates, top_k, min_similarity))
    }

    /// Domain frequency summary over all proteins.
    pub async fn domain_distribution(&self) -> Result<DomainDistribution> {
        let proteins = self.documents.list_proteins_projection(None).await?;
        Ok(domain_distribution(&proteins))
    }

    /// Store totals plus in-process connectivity analysis.
    pub async fn graph_statistics(&self) -> Result<GraphStatistics> {
        let totals = self.graph.graph_totals().await?;
        let extracted = self.extractor.extract().await?;
        Ok(GraphStatistics::from_totals(totals, connectivity(&extracted)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meilisearch::MockDocumentStore;
    use crate::models::ProteinRecord;
    use crate::neo4j::MockGraphStore;

    fn record(id: &str, domains: &[&str], ec: &[&str]) -> ProteinRecord {
        let mut r = ProteinRecord::new(id);
        r.domain_ids = domains.iter().map(|d| d.to_string()).collect();
        r.ec_numbers = ec.iter().map(|e| e.to_string()).collect();
        r
    }

    async fn make_engine() -> (SimilarityGraphEngine, Arc<MockGraphStore>) {
        let documents = Arc::new(
            MockDocumentStore::new()
                .with_records(vec![
                    record("A", &["d1", "d2"], &["1.1.1.1"]),
                    record("B", &["d2", "d3"], &[]),
                    record("C", &["d3", "d4"], &["2.2.2.2"]),
                    record("E", &[], &[]),
                ])
                .await,
        );
        let graph = Arc::new(MockGraphStore::new());
        (SimilarityGraphEngine::new(documents, graph.clone()), graph)
    }

    #[tokio::test]
    async fn test_build_graph_replaces_store_contents() {
        let (engine, graph) = make_engine().await;
        // Stale content must disappear on rebuild.
        graph
            .upsert_node(&ProteinNode::from(&record("OLD", &[], &[]).projection()))
            .await
            .unwrap();

        let report = engine.build_graph(&BuildGraphRequest::default()).await.unwrap();

        assert_eq!(report.protein_count, 4);
        assert_eq!(report.unique_domains, 4);
        assert_eq!(report.edge_count, 2);
        assert_eq!(report.nodes.succeeded, 4);
        assert_eq!(report.edges.succeeded, 2);
        assert_eq!(report.edges.failed, 0);

        let nodes = graph.nodes.read().await;
        assert!(!nodes.contains_key("OLD"));
        assert_eq!(nodes["A"].domain_count, 2);
        assert_eq!(nodes["A"].ec_numbers, vec!["1.1.1.1".to_string()]);
        assert_eq!(graph.edges.read().await.len(), 2);
    }

    #[tokio::test]
    async fn test_build_graph_respects_max_proteins() {
        let (engine, graph) = make_engine().await;
        let request = BuildGraphRequest {
            min_similarity: 0.1,
            max_proteins: Some(2),
        };
        let report = engine.build_graph(&request).await.unwrap();

        assert_eq!(report.protein_count, 2);
        assert_eq!(report.edge_count, 1);
        assert_eq!(graph.nodes.read().await.len(), 2);
    }

    #[tokio::test]
    async fn test_build_graph_rejects_invalid_request() {
        let (engine, graph) = make_engine().await;
        let request = BuildGraphRequest {
            min_similarity: -0.5,
            max_proteins: None,
        };
        assert!(engine.build_graph(&request).await.is_err());
        assert!(graph.nodes.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_queries() {
        let (engine, _graph) = make_engine().await;
        engine.build_graph(&BuildGraphRequest::default()).await.unwrap();

        let matrix = engine
            .similarity_matrix(&["A".into(), "B".into(), "missing".into()])
            .await
            .unwrap();
        assert_eq!(matrix.len(), 2);
        assert!((matrix["A"]["B"] - 1.0 / 3.0).abs() < 1e-12);

        let similar = engine.find_similar("B", 10, 0.0).await.unwrap();
        let ids: Vec<_> = similar.iter().map(|s| s.protein_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert!(engine.find_similar("missing", 10, 0.0).await.unwrap().is_empty());

        let dist = engine.domain_distribution().await.unwrap();
        assert_eq!(dist.total_unique_domains, 4);
        assert_eq!(dist.proteins_with_no_domains, 1);

        let stats = engine.graph_statistics().await.unwrap();
        assert_eq!(stats.totals.node_count, 4);
        assert_eq!(stats.totals.edge_count, 2);
        assert_eq!(stats.totals.isolated_node_count, 1);
        assert_eq!(stats.connectivity.component_count, 2);
        assert_eq!(stats.connectivity.largest_component_size, 3);
        assert!((stats.density - 2.0 * 2.0 / 12.0).abs() < 1e-12);
    }
}
