//! Meilisearch client for the protein document store

use super::indexes::*;
use crate::error::AnnotationError;
use crate::models::{Annotation, AnnotationType, ProteinProjection, ProteinRecord};
use anyhow::{Context, Result};
use meilisearch_sdk::{
    client::Client,
    documents::DocumentsQuery,
    errors::{Error as MeiliError, ErrorCode},
    indexes::Index,
    settings::Settings,
};

/// Client for Meilisearch operations
pub struct MeiliClient {
    client: Client,
}

impl MeiliClient {
    /// Create a new Meilisearch client and make sure the protein index exists.
    ///
    /// An unreachable server surfaces as [`AnnotationError::StoreUnavailable`].
    pub async fn new(url: &str, api_key: &str) -> Result<Self> {
        let key = (!api_key.is_empty()).then_some(api_key);
        let client = Client::new(url, key).context("Failed to create Meilisearch client")?;

        if let Err(e) = client.health().await {
            return Err(anyhow::Error::new(AnnotationError::StoreUnavailable(format!(
                "Meilisearch at {}",
                url
            )))
            .context(e.to_string()));
        }

        let meili = Self { client };
        meili.init_indexes().await?;

        Ok(meili)
    }

    /// Create and configure the protein index
    async fn init_indexes(&self) -> Result<()> {
        let task = self
            .client
            .create_index(index_names::PROTEINS, Some(PRIMARY_KEY))
            .await
            .context(format!("Failed to create index {}", index_names::PROTEINS))?;
        task.wait_for_completion(&self.client, None, None).await?;

        let settings = Settings::new()
            .with_searchable_attributes(SEARCHABLE_FIELDS)
            .with_filterable_attributes(FILTERABLE_FIELDS)
            .with_sortable_attributes([PRIMARY_KEY]);

        let task = self.proteins().set_settings(&settings).await?;
        task.wait_for_completion(&self.client, None, None).await?;

        Ok(())
    }

    fn proteins(&self) -> Index {
        self.client.index(index_names::PROTEINS)
    }

    // ========================================================================
    // Protein documents
    // ========================================================================

    /// Fetch a protein record, `None` when the document does not exist
    pub async fn get_protein(&self, protein_id: &str) -> Result<Option<ProteinRecord>> {
        match self
            .proteins()
            .get_document::<ProteinRecord>(protein_id)
            .await
        {
            Ok(record) => Ok(Some(record)),
            Err(MeiliError::Meilisearch(e)) if e.error_code == ErrorCode::DocumentNotFound => {
                Ok(None)
            }
            Err(e) => Err(e).context(format!("Failed to get protein {}", protein_id)),
        }
    }

    /// Scan the index in pages, keeping only the projection fields
    pub async fn list_proteins_projection(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<ProteinProjection>> {
        let index = self.proteins();
        let cap = limit.unwrap_or(usize::MAX);
        let mut out = Vec::new();
        let mut offset = 0;

        while out.len() < cap {
            let batch = SCAN_BATCH.min(cap - out.len());
            let mut query = DocumentsQuery::new(&index);
            query
                .with_offset(offset)
                .with_limit(batch)
                .with_fields(PROJECTION_FIELDS);
            let page = query
                .execute::<ProteinProjection>()
                .await
                .context("Failed to list protein projections")?;

            let fetched = page.results.len();
            out.extend(page.results);
            if fetched < batch {
                break;
            }
            offset += fetched;
        }

        tracing::debug!("Fetched {} protein projections", out.len());
        Ok(out)
    }

    /// Insert or replace a full record
    pub async fn insert_protein(&self, record: &ProteinRecord) -> Result<()> {
        let task = self
            .proteins()
            .add_or_replace(&[record], Some(PRIMARY_KEY))
            .await?;
        task.wait_for_completion(&self.client, None, None).await?;
        Ok(())
    }

    /// Replace the annotations of one kind on an existing record
    pub async fn replace_annotations(
        &self,
        protein_id: &str,
        kind: AnnotationType,
        annotations: &[Annotation],
    ) -> Result<bool> {
        let Some(mut record) = self.get_protein(protein_id).await? else {
            return Ok(false);
        };
        record.replace_annotations_of(kind, annotations);
        self.insert_protein(&record).await?;
        Ok(true)
    }

    /// Document counts for the protein index
    pub async fn document_stats(&self) -> Result<DocumentStats> {
        let stats = self.proteins().get_stats().await?;
        Ok(DocumentStats {
            total_documents: stats.number_of_documents,
            is_indexing: stats.is_indexing,
        })
    }
}
