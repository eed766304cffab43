//! Holdout evaluation of label propagation.
//!
//! A random fifth (at least one) of the seed-labeled proteins has its labels
//! masked; propagation then runs with fixed parameters and each held-out
//! protein is checked against its true labels. A prediction is any non-empty
//! result; it is correct when it shares at least one label with the truth.

use rand::seq::SliceRandom;
use rand::Rng;

use super::models::{EvaluationReport, PropagationParams};
use super::propagation::{propagate, LabelGraph};
use crate::error::AnnotationError;
use crate::models::Attribute;

/// `max(1, seeded / 5)`
pub fn holdout_size(seeded: usize) -> usize {
    (seeded / 5).max(1)
}

/// Evaluate recovery of masked labels on `graph`.
pub fn evaluate<R: Rng + ?Sized>(
    graph: &LabelGraph,
    attribute: Attribute,
    rng: &mut R,
) -> Result<EvaluationReport, AnnotationError> {
    let seeded = graph.seeded_indices();
    if seeded.is_empty() {
        return Err(AnnotationError::NoSeedLabels {
            attribute: attribute.to_string(),
        });
    }

    let size = holdout_size(seeded.len());
    let holdout: Vec<usize> = seeded.choose_multiple(rng, size).copied().collect();
    tracing::info!(
        "Evaluating {} propagation: holding out {} of {} seeded proteins",
        attribute,
        holdout.len(),
        seeded.len()
    );

    let masked = graph.masked(&holdout);
    let outcome = propagate(&masked, &PropagationParams::EVALUATION);

    let mut total_predictions = 0;
    let mut correct_predictions = 0;
    for &i in &holdout {
        let truth = graph.seed_at(i);
        let Some(predicted) = outcome.labels.get(graph.id_at(i)) else {
            continue;
        };
        if predicted.is_empty() {
            continue;
        }
        total_predictions += 1;
        if !predicted.is_disjoint(truth) {
            correct_predictions += 1;
        }
    }

    let accuracy = if total_predictions > 0 {
        correct_predictions as f64 / total_predictions as f64
    } else {
        0.0
    };

    Ok(EvaluationReport {
        attribute,
        holdout_size: holdout.len(),
        accuracy,
        coverage: total_predictions as f64 / holdout.len() as f64,
        correct_predictions,
        total_predictions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neo4j::LabeledNeighbors;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Ring of `n` proteins, all labeled with the same EC number.
    fn make_uniform_ring(n: usize) -> LabelGraph {
        let snapshot: Vec<LabeledNeighbors> = (0..n)
            .map(|i| {
                LabeledNeighbors::new(
                    format!("P{:02}", i),
                    ["1.1.1.1"],
                    [format!("P{:02}", (i + 1) % n), format!("P{:02}", (i + n - 1) % n)],
                )
            })
            .collect();
        LabelGraph::from_snapshot(&snapshot)
    }

    #[test]
    fn test_holdout_size() {
        assert_eq!(holdout_size(1), 1);
        assert_eq!(holdout_size(4), 1);
        assert_eq!(holdout_size(10), 2);
        assert_eq!(holdout_size(27), 5);
    }

    #[test]
    fn test_ten_seeded_proteins_hold_out_two() {
        let graph = make_uniform_ring(10);
        let mut rng = StdRng::seed_from_u64(7);
        let report = evaluate(&graph, Attribute::Ec, &mut rng).unwrap();

        assert_eq!(report.holdout_size, 2);
        assert!((report.coverage - report.total_predictions as f64 / 2.0).abs() < 1e-12);
        // Every neighbour carries the true label, so all predictions recover it.
        assert_eq!(report.total_predictions, 2);
        assert_eq!(report.correct_predictions, 2);
        assert_eq!(report.accuracy, 1.0);
    }

    #[test]
    fn test_isolated_holdout_yields_no_prediction() {
        let snapshot: Vec<LabeledNeighbors> = (0..5)
            .map(|i| LabeledNeighbors::new(format!("S{}", i), ["GO:1"], Vec::<String>::new()))
            .collect();
        let graph = LabelGraph::from_snapshot(&snapshot);
        let mut rng = StdRng::seed_from_u64(1);
        let report = evaluate(&graph, Attribute::Go, &mut rng).unwrap();

        assert_eq!(report.holdout_size, 1);
        assert_eq!(report.total_predictions, 0);
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.coverage, 0.0);
    }

    #[test]
    fn test_wrong_neighbour_labels_count_as_incorrect() {
        let graph = LabelGraph::from_snapshot(&[
            LabeledNeighbors::new("A", ["x"], ["B"]),
            LabeledNeighbors::new("B", Vec::<String>::new(), ["A", "C"]),
            LabeledNeighbors::new("C", ["y"], ["B"]),
        ]);
        // Two seeded proteins: holdout is one of A/C; its only neighbour B
        // learns the other label, so the prediction misses.
        let mut rng = StdRng::seed_from_u64(3);
        let report = evaluate(&graph, Attribute::Ec, &mut rng).unwrap();

        assert_eq!(report.holdout_size, 1);
        assert_eq!(report.total_predictions, 1);
        assert_eq!(report.correct_predictions, 0);
    }

    #[test]
    fn test_no_seed_labels_is_an_error() {
        let graph = LabelGraph::from_snapshot(&[LabeledNeighbors::new(
            "A",
            Vec::<String>::new(),
            Vec::<String>::new(),
        )]);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            evaluate(&graph, Attribute::Go, &mut rng),
            Err(AnnotationError::NoSeedLabels {
                attribute: "go".into()
            })
        );
    }
}
