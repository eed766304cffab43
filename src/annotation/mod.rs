//! Label propagation over the protein similarity graph.
//!
//! EC numbers or GO terms held by some proteins ("seeds") diffuse along
//! similarity edges to their neighbours, iterating synchronously until the
//! fraction of changed proteins drops below a threshold.
//!
//! ## Modules
//!
//! - [`models`]: Request validation, propagation parameters, result and report types
//! - [`propagation`]: `LabelGraph` and the iterative diffusion loop
//! - [`confidence`]: Three-level confidence scale
//! - [`evaluation`]: Holdout accuracy/coverage evaluation
//! - [`statistics`]: Coverage and label frequency reports
//! - [`service`]: `AnnotationService`, wiring the above to the stores

pub mod confidence;
pub mod evaluation;
pub mod models;
pub mod propagation;
pub mod service;
pub mod statistics;

pub use models::{
    AnnotationOverview, EvaluationReport, IterationStats, LabelStatistics, PropagationParams,
    PropagationRequest, PropagationResult, UpdatePolicy, WriteBackSummary, PROPAGATION_EVIDENCE,
};
pub use propagation::{propagate, LabelGraph};
pub use service::AnnotationService;
