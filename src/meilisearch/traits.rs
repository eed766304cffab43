//! Trait abstraction for the protein document store

use super::indexes::DocumentStats;
use crate::models::{Annotation, AnnotationType, ProteinProjection, ProteinRecord};
use anyhow::Result;
use async_trait::async_trait;

/// Owns protein records and their annotations.
///
/// Implemented by `MeiliClient` and by the in-memory `MockDocumentStore`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one protein record
    async fn get_protein(&self, protein_id: &str) -> Result<Option<ProteinRecord>>;

    /// Projection of every protein (up to `limit`) for similarity computation
    async fn list_proteins_projection(&self, limit: Option<usize>) -> Result<Vec<ProteinProjection>>;

    /// Insert or replace a full record
    async fn insert_protein(&self, record: &ProteinRecord) -> Result<()>;

    /// Replace all annotations of `kind` on a protein, keeping the others.
    /// Returns false when the protein is unknown.
    async fn replace_annotations(
        &self,
        protein_id: &str,
        kind: AnnotationType,
        annotations: &[Annotation],
    ) -> Result<bool>;

    /// Document counts
    async fn document_stats(&self) -> Result<DocumentStats>;
}

