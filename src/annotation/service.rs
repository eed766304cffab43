//! Annotation service: propagation, evaluation and statistics over the stores.
//!
//! The service fetches one graph snapshot per call, runs the synchronous
//! algorithms on it and, for propagation, writes the final labels back to
//! both stores. It holds no state between calls.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::confidence::score_all;
use super::evaluation::evaluate;
use super::models::{
    AnnotationOverview, EvaluationReport, LabelStatistics, PropagationRequest, PropagationResult,
    WriteBackSummary, PROPAGATION_EVIDENCE,
};
use super::propagation::{propagate, LabelGraph};
use super::statistics::{label_statistics, overview};
use crate::error::AnnotationError;
use crate::meilisearch::DocumentStore;
use crate::models::{Annotation, Attribute};
use crate::neo4j::{GraphStore, LabeledNeighbors};

/// Propagates, evaluates and reports on protein labels.
pub struct AnnotationService {
    graph: Arc<dyn GraphStore>,
    documents: Arc<dyn DocumentStore>,
}

impl AnnotationService {
    pub fn new(graph: Arc<dyn GraphStore>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { graph, documents }
    }

    async fn snapshot(&self, attribute: Attribute) -> Result<Vec<LabeledNeighbors>> {
        let snapshot = self
            .graph
            .neighbors_with_labels(attribute)
            .await
            .context("Failed to fetch propagation snapshot")?;
        tracing::info!(
            "Retrieved {} proteins for {} ({} with labels)",
            snapshot.len(),
            attribute,
            snapshot.iter().filter(|p| !p.labels.is_empty()).count()
        );
        Ok(snapshot)
    }

    /// Run label propagation and write the result back to both stores.
    pub async fn propagate_labels(&self, request: &PropagationRequest) -> Result<PropagationResult> {
        let (attribute, params) = request.validate()?;
        tracing::info!(
            "Starting {} label propagation (max_iterations={}, threshold={}, policy={})",
            attribute,
            params.max_iterations,
            params.threshold,
            params.policy.as_str()
        );

        let snapshot = self.snapshot(attribute).await?;
        if snapshot.is_empty() {
            return Err(AnnotationError::EmptyGraph {
                attribute: attribute.to_string(),
            }
            .into());
        }

        let graph = LabelGraph::from_snapshot(&snapshot);
        let outcome = propagate(&graph, &params);
        let confidence_scores = score_all(&graph.seeds(), &outcome.labels);

        let write_back = self.write_back(attribute, &outcome.labels).await;

        let annotated_proteins = outcome.annotated_count();
        tracing::info!(
            "Label propagation finished: {} iterations (converged={}), {} proteins annotated",
            outcome.iterations_completed,
            outcome.converged,
            annotated_proteins
        );

        Ok(PropagationResult {
            attribute,
            policy: params.policy,
            iterations_completed: outcome.iterations_completed,
            converged: outcome.converged,
            annotated_proteins,
            confidence_scores,
            predicted_labels: outcome
                .labels
                .into_iter()
                .map(|(id, labels)| (id, labels.into_iter().collect()))
                .collect(),
            trace: outcome.trace,
            write_back,
        })
    }

    /// Best-effort per-protein write-back; failures are tallied, never fatal.
    async fn write_back(
        &self,
        attribute: Attribute,
        labels: &BTreeMap<String, BTreeSet<String>>,
    ) -> WriteBackSummary {
        let mut summary = WriteBackSummary::default();
        let kind = attribute.annotation_type();

        for (protein_id, set) in labels {
            let values: Vec<String> = set.iter().cloned().collect();

            match self.graph.set_labels(protein_id, &values, attribute).await {
                Ok(true) => summary.graph.record_success(),
                Ok(false) => summary
                    .graph
                    .record_failure(protein_id, &anyhow!("protein node not found")),
                Err(e) => summary.graph.record_failure(protein_id, &e),
            }

            let annotations: Vec<Annotation> = values
                .iter()
                .map(|v| Annotation::new(kind, v.clone()).with_evidence(PROPAGATION_EVIDENCE))
                .collect();
            match self
                .documents
                .replace_annotations(protein_id, kind, &annotations)
                .await
            {
                Ok(true) => summary.documents.record_success(),
                Ok(false) => {
                    tracing::debug!("No document for {}, skipping annotation update", protein_id);
                    summary.missing_documents += 1;
                }
                Err(e) => summary.documents.record_failure(protein_id, &e),
            }
        }

        summary
    }

    /// Holdout evaluation; `seed` makes the sample reproducible.
    pub async fn evaluate_quality(&self, attribute: &str, seed: Option<u64>) -> Result<EvaluationReport> {
        let attribute: Attribute = attribute.parse()?;
        let snapshot = self.snapshot(attribute).await?;
        if snapshot.is_empty() {
            return Err(AnnotationError::EmptyGraph {
                attribute: attribute.to_string(),
            }
            .into());
        }

        let graph = LabelGraph::from_snapshot(&snapshot);
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let report = evaluate(&graph, attribute, &mut rng)?;
        tracing::info!(
            "Evaluation: accuracy={:.3}, coverage={:.3} over {} held-out proteins",
            report.accuracy,
            report.coverage,
            report.holdout_size
        );
        Ok(report)
    }

    /// Coverage and label frequency for one attribute.
    pub async fn statistics(&self, attribute: &str) -> Result<LabelStatistics> {
        let attribute: Attribute = attribute.parse()?;
        let snapshot = self.snapshot(attribute).await?;
        Ok(label_statistics(attribute, &snapshot))
    }

    /// Statistics for both attributes.
    pub async fn overview(&self) -> Result<AnnotationOverview> {
        let ec = label_statistics(Attribute::Ec, &self.snapshot(Attribute::Ec).await?);
        let go = label_statistics(Attribute::Go, &self.snapshot(Attribute::Go).await?);
        Ok(overview(ec, go))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::annotation_error;
    use crate::meilisearch::MockDocumentStore;
    use crate::models::{AnnotationType, ProteinRecord};
    use crate::neo4j::MockGraphStore;

    async fn make_chain_stores() -> (Arc<MockGraphStore>, Arc<MockDocumentStore>) {
        let graph = MockGraphStore::new()
            .with_labeled_node("A", Attribute::Ec, &["1.1.1.1"])
            .await
            .with_labeled_node("B", Attribute::Ec, &[])
            .await
            .with_labeled_node("C", Attribute::Ec, &["2.2.2.2"])
            .await
            .with_edge("A", "B", 1.0 / 3.0)
            .await
            .with_edge("B", "C", 1.0 / 3.0)
            .await;
        let mut b = ProteinRecord::new("B");
        b.go_terms = vec!["GO:0001".into()];
        let documents = MockDocumentStore::new()
            .with_records(vec![ProteinRecord::new("A"), b, ProteinRecord::new("C")])
            .await;
        (Arc::new(graph), Arc::new(documents))
    }

    #[tokio::test]
    async fn test_propagate_chain_and_write_back() {
        let (graph, documents) = make_chain_stores().await;
        let service = AnnotationService::new(graph.clone(), documents.clone());

        let mut request = PropagationRequest::new("ec");
        request.max_iterations = 10;
        let result = service.propagate_labels(&request).await.unwrap();

        assert_eq!(result.iterations_completed, 3);
        assert!(result.converged);
        assert_eq!(result.annotated_proteins, 3);
        assert_eq!(result.confidence_scores["A"], 1.0);
        assert_eq!(result.confidence_scores["B"], 0.5);
        assert_eq!(result.confidence_scores["C"], 1.0);
        let both = vec!["1.1.1.1".to_string(), "2.2.2.2".to_string()];
        assert_eq!(result.predicted_labels["B"], both);

        assert_eq!(result.write_back.graph.succeeded, 3);
        assert_eq!(result.write_back.documents.succeeded, 3);
        assert_eq!(graph.nodes.read().await["B"].ec_numbers, both);

        let b = documents.get_protein("B").await.unwrap().unwrap();
        assert_eq!(b.ec_numbers, both);
        assert_eq!(b.go_terms, vec!["GO:0001".to_string()]);
        assert!(b
            .annotations
            .iter()
            .filter(|a| a.annotation_type == AnnotationType::Ec)
            .all(|a| a.evidence.as_deref() == Some(PROPAGATION_EVIDENCE)));
    }

    #[tokio::test]
    async fn test_write_back_failures_are_tallied() {
        let (graph, documents) = make_chain_stores().await;
        let graph = Arc::new(
            Arc::try_unwrap(graph)
                .ok()
                .unwrap()
                .with_failing_write("B")
                .await
                .with_labeled_node("Z", Attribute::Ec, &[])
                .await,
        );
        let service = AnnotationService::new(graph, documents);

        let result = service
            .propagate_labels(&PropagationRequest::new("ec"))
            .await
            .unwrap();

        assert_eq!(result.write_back.graph.succeeded, 3);
        assert_eq!(result.write_back.graph.failed, 1);
        assert_eq!(result.write_back.graph.failures[0].protein_id, "B");
        // Z is only in the graph
        assert_eq!(result.write_back.missing_documents, 1);
        assert_eq!(result.write_back.documents.succeeded, 3);
    }

    #[tokio::test]
    async fn test_invalid_attribute_rejected_before_store_access() {
        let service = AnnotationService::new(
            Arc::new(MockGraphStore::new()),
            Arc::new(MockDocumentStore::new()),
        );
        let err = service
            .propagate_labels(&PropagationRequest::new("kegg"))
            .await
            .unwrap_err();
        assert!(matches!(
            annotation_error(&err),
            Some(AnnotationError::InvalidAttribute(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_graph_fails_fast() {
        let service = AnnotationService::new(
            Arc::new(MockGraphStore::new()),
            Arc::new(MockDocumentStore::new()),
        );
        let err = service
            .propagate_labels(&PropagationRequest::new("go"))
            .await
            .unwrap_err();
        assert!(matches!(
            annotation_error(&err),
            Some(AnnotationError::EmptyGraph { .. })
        ));

        let err = service.evaluate_quality("go", Some(1)).await.unwrap_err();
        assert!(matches!(
            annotation_error(&err),
            Some(AnnotationError::EmptyGraph { .. })
        ));
    }

    #[tokio::test]
    async fn test_evaluate_without_seeds() {
        let graph = MockGraphStore::new()
            .with_labeled_node("A", Attribute::Go, &[])
            .await;
        let service = AnnotationService::new(Arc::new(graph), Arc::new(MockDocumentStore::new()));
        let err = service.evaluate_quality("go", Some(1)).await.unwrap_err();
        assert!(matches!(
            annotation_error(&err),
            Some(AnnotationError::NoSeedLabels { .. })
        ));
    }

    #[tokio::test]
    async fn test_statistics_and_overview() {
        let (graph, documents) = make_chain_stores().await;
        let service = AnnotationService::new(graph, documents);

        let stats = service.statistics("ec").await.unwrap();
        assert_eq!(stats.total_proteins, 3);
        assert_eq!(stats.annotated_proteins, 2);

        let overview = service.overview().await.unwrap();
        assert_eq!(overview.total_proteins, 3);
        assert_eq!(overview.ec_annotated, 2);
        assert_eq!(overview.go_annotated, 0);
    }
}
