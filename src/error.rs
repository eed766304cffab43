//! Annotation error taxonomy.
//!
//! Store and service layers return `anyhow::Result`; the variants below are
//! wrapped into it so callers can recover the category with
//! `err.downcast_ref::<AnnotationError>()`.

use thiserror::Error;

/// Failures specific to graph construction, propagation and evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnotationError {
    /// Attribute outside `{"ec", "go"}`. Raised before any store access.
    #[error("attribute must be 'ec' or 'go', got '{0}'")]
    InvalidAttribute(String),

    /// The graph store returned no proteins for the attribute.
    #[error("no proteins found for label propagation on '{attribute}'")]
    EmptyGraph { attribute: String },

    /// Evaluation needs at least one protein with seed labels.
    #[error("no initially annotated proteins found for '{attribute}' evaluation")]
    NoSeedLabels { attribute: String },

    /// A request parameter is out of its accepted range.
    #[error("invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A store was called before its connection was established.
    #[error("{0} is not connected")]
    StoreUnavailable(String),
}

/// Returns the [`AnnotationError`] carried by an `anyhow::Error`, if any.
pub fn annotation_error(err: &anyhow::Error) -> Option<&AnnotationError> {
    err.downcast_ref::<AnnotationError>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = AnnotationError::InvalidAttribute("kegg".into());
        assert_eq!(err.to_string(), "attribute must be 'ec' or 'go', got 'kegg'");

        let err = AnnotationError::EmptyGraph {
            attribute: "go".into(),
        };
        assert!(err.to_string().contains("'go'"));
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = AnnotationError::NoSeedLabels {
            attribute: "ec".into(),
        }
        .into();
        let err = err.context("evaluation failed");

        assert!(matches!(
            annotation_error(&err),
            Some(AnnotationError::NoSeedLabels { .. })
        ));
    }
}
