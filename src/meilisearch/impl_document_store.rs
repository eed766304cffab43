//! DocumentStore trait implementation for MeiliClient
//!
//! Each trait method delegates directly to the corresponding inherent method
//! on `MeiliClient`.

use anyhow::Result;
use async_trait::async_trait;

use super::client::MeiliClient;
use super::indexes::DocumentStats;
use super::traits::DocumentStore;
use crate::models::{Annotation, AnnotationType, ProteinProjection, ProteinRecord};

#[async_trait]
impl DocumentStore for MeiliClient {
    async fn get_protein(&self, protein_id: &str) -> Result<Option<ProteinRecord>> {
        self.get_protein(protein_id).await
    }

    async fn list_proteins_projection(&self, limit: Option<usize>) -> Result<Vec<ProteinProjection>> {
        self.list_proteins_projection(limit).await
    }

    async fn insert_protein(&self, record: &ProteinRecord) -> Result<()> {
        self.insert_protein(record).await
    }

    async fn replace_annotations(
        &self,
        protein_id: &str,
        kind: AnnotationType,
        annotations: &[Annotation],
    ) -> Result<bool> {
        self.replace_annotations(protein_id, kind, annotations).await
    }

    async fn document_stats(&self) -> Result<DocumentStats> {
        self.document_stats().await
    }
}
