//! Label propagation data models.
//!
//! ## Requests
//! - [`PropagationRequest`]: caller-facing parameters, validated before any store access
//! - [`PropagationParams`]: the subset the algorithm itself consumes
//!
//! ## Results
//! - [`PropagationOutcome`]: raw fixed-point result with per-iteration trace
//! - [`PropagationResult`]: outcome plus confidence, write-back tally
//! - [`EvaluationReport`], [`LabelStatistics`], [`AnnotationOverview`]

use crate::error::AnnotationError;
use crate::graph::models::default_min_similarity;
use crate::models::{Attribute, WriteTally};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Evidence code attached to annotations written back after propagation.
pub const PROPAGATION_EVIDENCE: &str = "label_propagation";

// ============================================================================
// Update policy
// ============================================================================

/// How a protein's new label set is derived from its neighbours' labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePolicy {
    /// Union of every label held by any neighbour.
    #[default]
    Union,
    /// Only the labels held by the largest number of neighbours (ties kept).
    Majority,
}

impl UpdatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Union => "union",
            Self::Majority => "majority",
        }
    }
}

impl FromStr for UpdatePolicy {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "union" => Ok(Self::Union),
            "majority" => Ok(Self::Majority),
            _ => Err(AnnotationError::InvalidParameter {
                name: "policy",
                value: s.to_string(),
                reason: "must be 'union' or 'majority'",
            }),
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Parameters consumed by the propagation algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagationParams {
    pub max_iterations: usize,
    pub threshold: f64,
    pub policy: UpdatePolicy,
}

impl PropagationParams {
    /// Fixed parameters used by holdout evaluation.
    pub const EVALUATION: PropagationParams = PropagationParams {
        max_iterations: 100,
        threshold: 0.01,
        policy: UpdatePolicy::Union,
    };
}

impl Default for PropagationParams {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            threshold: default_threshold(),
            policy: UpdatePolicy::default(),
        }
    }
}

fn default_max_iterations() -> usize {
    100
}

fn default_threshold() -> f64 {
    0.01
}

/// A label propagation request.
///
/// `min_similarity` is accepted for parity with graph construction but the
/// propagation itself does not use it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationRequest {
    pub attribute: String,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,
    #[serde(default)]
    pub policy: UpdatePolicy,
}

impl PropagationRequest {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            max_iterations: default_max_iterations(),
            threshold: default_threshold(),
            min_similarity: default_min_similarity(),
            policy: UpdatePolicy::default(),
        }
    }

    /// Check the attribute first, then every numeric range.
    pub fn validate(&self) -> Result<(Attribute, PropagationParams), AnnotationError> {
        let attribute: Attribute = self.attribute.parse()?;

        if !(1..=1000).contains(&self.max_iterations) {
            return Err(AnnotationError::InvalidParameter {
                name: "max_iterations",
                value: self.max_iterations.to_string(),
                reason: "must be within [1, 1000]",
            });
        }
        if !(0.0001..=1.0).contains(&self.threshold) {
            return Err(AnnotationError::InvalidParameter {
                name: "threshold",
                value: self.threshold.to_string(),
                reason: "must be within [0.0001, 1]",
            });
        }
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(AnnotationError::InvalidParameter {
                name: "min_similarity",
                value: self.min_similarity.to_string(),
                reason: "must be within [0, 1]",
            });
        }

        Ok((
            attribute,
            PropagationParams {
                max_iterations: self.max_iterations,
                threshold: self.threshold,
                policy: self.policy,
            },
        ))
    }
}

// ============================================================================
// Results
// ============================================================================

/// Change count of one synchronous iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationStats {
    /// 1-based
    pub iteration: usize,
    pub changed: usize,
    /// `changed / protein_count`
    pub convergence_rate: f64,
}

/// Final label assignment of a propagation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationOutcome {
    pub labels: BTreeMap<String, BTreeSet<String>>,
    pub iterations_completed: usize,
    pub converged: bool,
    pub trace: Vec<IterationStats>,
}

impl PropagationOutcome {
    /// Proteins with a non-empty final label set.
    pub fn annotated_count(&self) -> usize {
        self.labels.values().filter(|l| !l.is_empty()).count()
    }
}

/// Outcome of writing propagated labels back to both stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteBackSummary {
    pub graph: WriteTally,
    pub documents: WriteTally,
    /// Proteins present in the graph but absent from the document store
    pub missing_documents: usize,
}

/// Result of a propagation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationResult {
    pub attribute: Attribute,
    pub policy: UpdatePolicy,
    pub iterations_completed: usize,
    pub converged: bool,
    pub annotated_proteins: usize,
    pub confidence_scores: BTreeMap<String, f64>,
    pub predicted_labels: BTreeMap<String, Vec<String>>,
    pub trace: Vec<IterationStats>,
    pub write_back: WriteBackSummary,
}

/// Holdout evaluation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub attribute: Attribute,
    pub holdout_size: usize,
    pub accuracy: f64,
    pub coverage: f64,
    pub correct_predictions: usize,
    pub total_predictions: usize,
}

/// Annotation coverage and label frequency for one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelStatistics {
    pub attribute: Attribute,
    pub total_proteins: usize,
    pub annotated_proteins: usize,
    pub unannotated_proteins: usize,
    pub annotation_rate: f64,
    pub unique_labels: usize,
    /// Up to 10 `(label, count)` pairs, most frequent first
    pub most_common_labels: Vec<(String, usize)>,
    /// Mean labels per annotated protein (0 when none)
    pub average_labels_per_protein: f64,
}

/// Statistics for both attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationOverview {
    pub total_proteins: usize,
    pub ec_annotated: usize,
    pub go_annotated: usize,
    pub ec: LabelStatistics,
    pub go: LabelStatistics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: PropagationRequest = serde_json::from_str(r#"{"attribute": "go"}"#).unwrap();
        assert_eq!(request.max_iterations, 100);
        assert_eq!(request.threshold, 0.01);
        assert_eq!(request.min_similarity, 0.1);
        assert_eq!(request.policy, UpdatePolicy::Union);

        let (attribute, params) = request.validate().unwrap();
        assert_eq!(attribute, Attribute::Go);
        assert_eq!(params, PropagationParams::default());
    }

    #[test]
    fn test_attribute_checked_before_ranges() {
        let mut request = PropagationRequest::new("kegg");
        request.max_iterations = 0;
        assert_eq!(
            request.validate(),
            Err(AnnotationError::InvalidAttribute("kegg".into()))
        );
    }

    #[test]
    fn test_range_validation() {
        let mut request = PropagationRequest::new("ec");
        request.max_iterations = 1001;
        assert!(matches!(
            request.validate(),
            Err(AnnotationError::InvalidParameter { name: "max_iterations", .. })
        ));

        let mut request = PropagationRequest::new("ec");
        request.threshold = 0.00001;
        assert!(matches!(
            request.validate(),
            Err(AnnotationError::InvalidParameter { name: "threshold", .. })
        ));

        let mut request = PropagationRequest::new("ec");
        request.max_iterations = 1;
        request.threshold = 1.0;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("Majority".parse::<UpdatePolicy>().unwrap(), UpdatePolicy::Majority);
        assert!("top-k".parse::<UpdatePolicy>().is_err());
    }
}
