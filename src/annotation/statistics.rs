//! Annotation coverage and label frequency reporting.

use std::collections::HashMap;

use super::models::{AnnotationOverview, LabelStatistics};
use crate::models::Attribute;
use crate::neo4j::LabeledNeighbors;

/// Number of labels listed in [`LabelStatistics::most_common_labels`].
const TOP_LABELS: usize = 10;

/// Coverage and frequency summary of `attribute` over a store snapshot.
///
/// Label occurrences are counted as stored, so a label repeated on one
/// protein counts once per occurrence.
pub fn label_statistics(attribute: Attribute, snapshot: &[LabeledNeighbors]) -> LabelStatistics {
    let total_proteins = snapshot.len();
    let annotated_proteins = snapshot.iter().filter(|p| !p.labels.is_empty()).count();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut total_labels = 0usize;
    for protein in snapshot {
        for label in &protein.labels {
            *counts.entry(label.as_str()).or_insert(0) += 1;
            total_labels += 1;
        }
    }

    let mut most_common: Vec<(String, usize)> =
        counts.iter().map(|(l, c)| (l.to_string(), *c)).collect();
    most_common.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    most_common.truncate(TOP_LABELS);

    LabelStatistics {
        attribute,
        total_proteins,
        annotated_proteins,
        unannotated_proteins: total_proteins - annotated_proteins,
        annotation_rate: ratio(annotated_proteins, total_proteins),
        unique_labels: counts.len(),
        most_common_labels: most_common,
        average_labels_per_protein: ratio(total_labels, annotated_proteins),
    }
}

/// Combine per-attribute statistics into one overview.
pub fn overview(ec: LabelStatistics, go: LabelStatistics) -> AnnotationOverview {
    AnnotationOverview {
        total_proteins: ec.total_proteins.max(go.total_proteins),
        ec_annotated: ec.annotated_proteins,
        go_annotated: go.annotated_proteins,
        ec,
        go,
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
