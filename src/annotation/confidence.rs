//! Static three-level confidence scale for propagated labels.

use std::collections::{BTreeMap, BTreeSet};

/// No labels after propagation.
pub const NO_LABELS: f64 = 0.0;
/// Labels acquired purely through diffusion.
pub const PROPAGATED: f64 = 0.5;
/// The protein carried seed labels before propagation.
pub const SEEDED: f64 = 1.0;

/// Confidence of one protein's final assignment.
pub fn confidence(seed: &BTreeSet<String>, predicted: &BTreeSet<String>) -> f64 {
    if predicted.is_empty() {
        NO_LABELS
    } else if !seed.is_empty() {
        SEEDED
    } else {
        PROPAGATED
    }
}

/// Score every protein of `predicted` against its seed set (missing seed = empty).
pub fn score_all(
    seeds: &BTreeMap<String, BTreeSet<String>>,
    predicted: &BTreeMap<String, BTreeSet<String>>,
) -> BTreeMap<String, f64> {
    let empty = BTreeSet::new();
    predicted
        .iter()
        .map(|(id, labels)| {
            let seed = seeds.get(id).unwrap_or(&empty);
            (id.clone(), confidence(seed, labels))
        })
        .collect()
}
