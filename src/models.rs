//! Typed protein records shared by the store adapters and the core.

use crate::error::AnnotationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Attribute
// ============================================================================

/// Label attribute subject to propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    /// Enzyme Commission numbers
    Ec,
    /// Gene Ontology terms
    Go,
}

impl Attribute {
    /// Both supported attributes, in reporting order.
    pub const ALL: [Attribute; 2] = [Attribute::Ec, Attribute::Go];

    /// Short wire name ("ec" / "go").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ec => "ec",
            Self::Go => "go",
        }
    }

    /// Node/document property holding the labels for this attribute.
    pub fn property(&self) -> &'static str {
        match self {
            Self::Ec => "ec_numbers",
            Self::Go => "go_terms",
        }
    }

    /// Annotation type written back for this attribute.
    pub fn annotation_type(&self) -> AnnotationType {
        match self {
            Self::Ec => AnnotationType::Ec,
            Self::Go => AnnotationType::Go,
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ec" => Ok(Self::Ec),
            "go" => Ok(Self::Go),
            other => Err(AnnotationError::InvalidAttribute(other.to_string())),
        }
    }
}

// ============================================================================
// Protein records
// ============================================================================

/// Review status of a protein entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProteinStatus {
    Reviewed,
    #[default]
    Unreviewed,
}

impl ProteinStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reviewed => "reviewed",
            Self::Unreviewed => "unreviewed",
        }
    }

    /// Lenient parse: anything other than "reviewed" is unreviewed.
    pub fn parse_lenient(s: &str) -> Self {
        if s.eq_ignore_ascii_case("reviewed") {
            Self::Reviewed
        } else {
            Self::Unreviewed
        }
    }
}

/// Kind of functional annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationType {
    Go,
    Ec,
    Interpro,
}

/// A single functional annotation on a protein.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub annotation_type: AnnotationType,
    pub annotation_value: String,
    #[serde(default)]
    pub evidence: Option<String>,
}

impl Annotation {
    pub fn new(annotation_type: AnnotationType, value: impl Into<String>) -> Self {
        Self {
            annotation_type,
            annotation_value: value.into(),
            evidence: None,
        }
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }
}

/// Full protein record as owned by the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinRecord {
    pub protein_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub taxonomy_id: Option<String>,
    #[serde(default)]
    pub taxonomy_name: Option<String>,
    #[serde(default)]
    pub status: ProteinStatus,
    #[serde(default)]
    pub domain_ids: Vec<String>,
    #[serde(default)]
    pub ec_numbers: Vec<String>,
    #[serde(default)]
    pub go_terms: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProteinRecord {
    /// Minimal record with only an id; everything else defaulted.
    pub fn new(protein_id: impl Into<String>) -> Self {
        Self {
            protein_id: protein_id.into(),
            name: None,
            description: None,
            taxonomy_id: None,
            taxonomy_name: None,
            status: ProteinStatus::Unreviewed,
            domain_ids: Vec::new(),
            ec_numbers: Vec::new(),
            go_terms: Vec::new(),
            annotations: Vec::new(),
            updated_at: None,
        }
    }

    pub fn labels(&self, attribute: Attribute) -> &[String] {
        match attribute {
            Attribute::Ec => &self.ec_numbers,
            Attribute::Go => &self.go_terms,
        }
    }

    /// Replace the annotations of `kind`, keeping the other kinds, and
    /// refresh the denormalised label list for that kind.
    pub fn replace_annotations_of(&mut self, kind: AnnotationType, annotations: &[Annotation]) {
        self.annotations.retain(|a| a.annotation_type != kind);
        self.annotations
            .extend(annotations.iter().filter(|a| a.annotation_type == kind).cloned());
        let values = values_of(&self.annotations, kind);
        match kind {
            AnnotationType::Ec => self.ec_numbers = values,
            AnnotationType::Go => self.go_terms = values,
            AnnotationType::Interpro => {}
        }
        self.updated_at = Some(Utc::now());
    }

    pub fn projection(&self) -> ProteinProjection {
        ProteinProjection {
            protein_id: self.protein_id.clone(),
            name: self.name.clone(),
            status: self.status,
            taxonomy_id: self.taxonomy_id.clone(),
            domain_ids: self.domain_ids.clone(),
            ec_numbers: self.ec_numbers.clone(),
            go_terms: self.go_terms.clone(),
        }
    }
}

fn values_of(annotations: &[Annotation], kind: AnnotationType) -> Vec<String> {
    annotations
        .iter()
        .filter(|a| a.annotation_type == kind)
        .map(|a| a.annotation_value.clone())
        .collect()
}

/// Projection used for similarity computation and graph construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinProjection {
    pub protein_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: ProteinStatus,
    #[serde(default)]
    pub taxonomy_id: Option<String>,
    #[serde(default)]
    pub domain_ids: Vec<String>,
    #[serde(default)]
    pub ec_numbers: Vec<String>,
    #[serde(default)]
    pub go_terms: Vec<String>,
}

// ============================================================================
// Partial-failure tallies
// ============================================================================

/// Maximum number of individual failures kept in a tally.
pub const MAX_REPORTED_FAILURES: usize = 10;

/// One skipped per-protein write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteFailure {
    pub protein_id: String,
    pub error: String,
}

/// Success/failure tally for best-effort bulk writes.
///
/// Individual failures never abort the batch; the first
/// [`MAX_REPORTED_FAILURES`] are kept as a sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteTally {
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<WriteFailure>,
}

impl WriteTally {
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, protein_id: &str, error: &anyhow::Error) {
        tracing::warn!("Write failed for {}: {:#}", protein_id, error);
        self.failed += 1;
        if self.failures.len() < MAX_REPORTED_FAILURES {
            self.failures.push(WriteFailure {
                protein_id: protein_id.to_string(),
                error: format!("{:#}", error),
            });
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total() as f64
        }
    }
}
