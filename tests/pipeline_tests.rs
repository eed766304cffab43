//! End-to-end pipeline on the in-memory stores:
//! import → build-graph → propagate → evaluate → statistics.
//!
//! Run with: cargo test --test pipeline_tests

use protein_annotator::annotation::{PropagationRequest, UpdatePolicy};
use protein_annotator::error::AnnotationError;
use protein_annotator::graph::BuildGraphRequest;
use protein_annotator::ingest::{generate_sample, import_records};
use protein_annotator::meilisearch::DocumentStore;
use protein_annotator::models::{AnnotationType, ProteinRecord};
use protein_annotator::neo4j::GraphStore;
use protein_annotator::{AppState, Config};

fn record(id: &str, domains: &[&str], ec: &[&str], go: &[&str]) -> ProteinRecord {
    let mut r = ProteinRecord::new(id);
    r.name = Some(format!("{} protein", id));
    r.domain_ids = domains.iter().map(|d| d.to_string()).collect();
    r.ec_numbers = ec.iter().map(|e| e.to_string()).collect();
    r.go_terms = go.iter().map(|g| g.to_string()).collect();
    r
}

/// A–B–C chain through shared domains plus an isolated D.
fn chain_records() -> Vec<ProteinRecord> {
    vec![
        record("A", &["IPR1", "IPR2"], &["1.1.1.1"], &[]),
        record("B", &["IPR2", "IPR3"], &[], &["GO:0005515"]),
        record("C", &["IPR3", "IPR4"], &["2.2.2.2"], &[]),
        record("D", &["IPR9"], &[], &["GO:0003674"]),
    ]
}

async fn make_state(records: &[ProteinRecord]) -> AppState {
    let config = Config::from_yaml_and_env(Some(std::path::Path::new(
        "/nonexistent/pipeline-config.yaml",
    )))
    .unwrap();
    let state = AppState::offline(config);
    let summary = import_records(state.documents.as_ref(), records).await;
    assert_eq!(summary.failed_count, 0);
    state
}

fn request(attribute: &str) -> PropagationRequest {
    let mut request = PropagationRequest::new(attribute);
    request.max_iterations = 10;
    request
}

#[tokio::test]
async fn test_full_pipeline_on_chain() {
    let state = make_state(&chain_records()).await;
    let engine = state.similarity_engine();
    let service = state.annotation_service();

    // Build
    let report = engine.build_graph(&BuildGraphRequest::default()).await.unwrap();
    assert_eq!(report.protein_count, 4);
    assert_eq!(report.edge_count, 2);
    assert_eq!(report.nodes.succeeded, 4);
    assert_eq!(report.edges.succeeded, 2);

    let stats = engine.graph_statistics().await.unwrap();
    assert_eq!(stats.totals.node_count, 4);
    assert_eq!(stats.totals.edge_count, 2);
    assert_eq!(stats.totals.isolated_node_count, 1);
    assert_eq!(stats.connectivity.component_count, 2);
    assert_eq!(stats.connectivity.largest_component_size, 3);

    // Propagate
    let result = service.propagate_labels(&request("ec")).await.unwrap();
    assert!(result.converged);
    assert_eq!(result.iterations_completed, 3);
    let changes: Vec<usize> = result.trace.iter().map(|s| s.changed).collect();
    assert_eq!(changes, vec![1, 2, 0]);
    assert_eq!(result.annotated_proteins, 3);
    assert_eq!(result.confidence_scores["B"], 0.5);
    assert_eq!(result.confidence_scores["D"], 0.0);
    assert!(result.predicted_labels["D"].is_empty());
    assert_eq!(result.write_back.graph.failed, 0);
    assert_eq!(result.write_back.documents.failed, 0);
    assert_eq!(result.write_back.missing_documents, 0);

    // Write-back reached both stores; GO data untouched
    let b = state.documents.get_protein("B").await.unwrap().unwrap();
    assert_eq!(b.ec_numbers, vec!["1.1.1.1".to_string(), "2.2.2.2".to_string()]);
    assert_eq!(b.go_terms, vec!["GO:0005515".to_string()]);
    assert_eq!(
        b.annotations
            .iter()
            .filter(|a| a.annotation_type == AnnotationType::Ec)
            .count(),
        2
    );
    let hits = state.graph.search_proteins("b prot", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].ec_numbers.len(), 2);

    // Evaluate: every neighbour now carries both labels
    let evaluation = service.evaluate_quality("ec", Some(11)).await.unwrap();
    assert_eq!(evaluation.holdout_size, 1);
    assert_eq!(evaluation.accuracy, 1.0);
    assert_eq!(evaluation.coverage, 1.0);

    // Statistics
    let ec = service.statistics("ec").await.unwrap();
    assert_eq!(ec.total_proteins, 4);
    assert_eq!(ec.annotated_proteins, 3);
    assert_eq!(ec.unique_labels, 2);

    let overview = service.overview().await.unwrap();
    assert_eq!(overview.ec_annotated, 3);
    assert_eq!(overview.go_annotated, 2);
}

#[tokio::test]
async fn test_propagation_is_idempotent_after_write_back() {
    let state = make_state(&chain_records()).await;
    state
        .similarity_engine()
        .build_graph(&BuildGraphRequest::default())
        .await
        .unwrap();
    let service = state.annotation_service();

    let first = service.propagate_labels(&request("ec")).await.unwrap();
    let second = service.propagate_labels(&request("ec")).await.unwrap();

    assert_eq!(first.predicted_labels, second.predicted_labels);
    assert_eq!(second.iterations_completed, 1);
    assert_eq!(second.trace[0].changed, 0);
}

#[tokio::test]
async fn test_validation_errors_surface_as_annotation_errors() {
    let state = make_state(&chain_records()).await;
    let service = state.annotation_service();

    let err = service
        .propagate_labels(&PropagationRequest::new("pfam"))
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<AnnotationError>(),
        Some(&AnnotationError::InvalidAttribute("pfam".into()))
    );

    let mut bad = request("go");
    bad.threshold = 0.0;
    let err = service.propagate_labels(&bad).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnnotationError>(),
        Some(AnnotationError::InvalidParameter { name: "threshold", .. })
    ));

    // Nothing built yet: the graph store is empty
    let err = service.propagate_labels(&request("go")).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnnotationError>(),
        Some(AnnotationError::EmptyGraph { .. })
    ));

    let bad_build = BuildGraphRequest {
        min_similarity: 1.5,
        max_proteins: None,
    };
    let err = state
        .similarity_engine()
        .build_graph(&bad_build)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnnotationError>(),
        Some(AnnotationError::InvalidParameter { .. })
    ));
}

#[tokio::test]
async fn test_similarity_queries() {
    let state = make_state(&chain_records()).await;
    let engine = state.similarity_engine();

    let similar = engine.find_similar("B", 5, 0.0).await.unwrap();
    let ids: Vec<&str> = similar.iter().map(|s| s.protein_id.as_str()).collect();
    assert_eq!(ids, vec!["A", "C"]);
    assert!((similar[0].similarity - 1.0 / 3.0).abs() < 1e-9);

    assert!(engine.find_similar("missing", 5, 0.0).await.unwrap().is_empty());

    let matrix = engine
        .similarity_matrix(&["A".to_string(), "C".to_string(), "missing".to_string()])
        .await
        .unwrap();
    assert_eq!(matrix.len(), 2);
    assert_eq!(matrix["A"]["A"], 1.0);
    assert_eq!(matrix["A"]["C"], 0.0);

    let distribution = engine.domain_distribution().await.unwrap();
    assert_eq!(distribution.total_unique_domains, 5);
    assert_eq!(distribution.max_domains_per_protein, 2);
    assert_eq!(distribution.min_domains_per_protein, 1);
}

#[tokio::test]
async fn test_majority_policy_on_sample_data() {
    let records = generate_sample(60, 5);
    let state = make_state(&records).await;
    let report = state
        .similarity_engine()
        .build_graph(&BuildGraphRequest {
            min_similarity: 0.2,
            max_proteins: None,
        })
        .await
        .unwrap();
    assert_eq!(report.protein_count, 60);

    let mut majority = request("go");
    majority.max_iterations = 50;
    majority.policy = UpdatePolicy::Majority;
    let result = state
        .annotation_service()
        .propagate_labels(&majority)
        .await
        .unwrap();

    assert_eq!(result.policy, UpdatePolicy::Majority);
    assert_eq!(result.predicted_labels.len(), 60);
    assert!(result.iterations_completed >= 1 && result.iterations_completed <= 50);
    assert_eq!(result.trace.len(), result.iterations_completed);
    for (id, score) in &result.confidence_scores {
        assert!(
            [0.0, 0.5, 1.0].contains(score),
            "unexpected confidence {} for {}",
            score,
            id
        );
    }
}
