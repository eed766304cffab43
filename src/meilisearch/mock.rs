//! In-memory mock implementation of DocumentStore for running without a real
//! Meilisearch instance.

use super::indexes::DocumentStats;
use super::traits::DocumentStore;
use crate::models::{Annotation, AnnotationType, ProteinProjection, ProteinRecord};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// In-memory mock implementation of DocumentStore.
///
/// Records live in a `HashMap` behind an async `RwLock`; listings are
/// returned in protein id order.
#[derive(Default)]
pub struct MockDocumentStore {
    pub proteins: RwLock<HashMap<String, ProteinRecord>>,
    /// Protein ids whose writes fail (failure injection)
    pub failing_writes: RwLock<HashSet<String>>,
}

impl MockDocumentStore {
    /// Create a new empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed records into the store.
    pub async fn with_records(self, records: impl IntoIterator<Item = ProteinRecord>) -> Self {
        {
            let mut proteins = self.proteins.write().await;
            for record in records {
                proteins.insert(record.protein_id.clone(), record);
            }
        }
        self
    }

    /// Make writes for this protein fail.
    pub async fn with_failing_write(self, protein_id: &str) -> Self {
        self.failing_writes
            .write()
            .await
            .insert(protein_id.to_string());
        self
    }

    async fn check_writable(&self, protein_id: &str) -> Result<()> {
        if self.failing_writes.read().await.contains(protein_id) {
            return Err(anyhow!("injected write failure for {}", protein_id));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MockDocumentStore {
    async fn get_protein(&self, protein_id: &str) -> Result<Option<ProteinRecord>> {
        Ok(self.proteins.read().await.get(protein_id).cloned())
    }

    async fn list_proteins_projection(&self, limit: Option<usize>) -> Result<Vec<ProteinProjection>> {
        let proteins = self.proteins.read().await;
        let mut records: Vec<&ProteinRecord> = proteins.values().collect();
        records.sort_by(|a, b| a.protein_id.cmp(&b.protein_id));
        Ok(records
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(ProteinRecord::projection)
            .collect())
    }

    async fn insert_protein(&self, record: &ProteinRecord) -> Result<()> {
        self.check_writable(&record.protein_id).await?;
        self.proteins
            .write()
            .await
            .insert(record.protein_id.clone(), record.clone());
        Ok(())
    }

    async fn replace_annotations(
        &self,
        protein_id: &str,
        kind: AnnotationType,
        annotations: &[Annotation],
    ) -> Result<bool> {
        self.check_writable(protein_id).await?;
        let mut proteins = self.proteins.write().await;
        match proteins.get_mut(protein_id) {
            Some(record) => {
                record.replace_annotations_of(kind, annotations);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn document_stats(&self) -> Result<DocumentStats> {
        Ok(DocumentStats {
            total_documents: self.proteins.read().await.len(),
            is_indexing: false,
        })
    }
}
