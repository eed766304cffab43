//! Bulk loading of protein records into the document store.
//!
//! Records arrive already typed (JSON array of [`ProteinRecord`]) or are
//! generated by [`sample::generate_sample`]. Inserts are best-effort: a
//! failing record is tallied and skipped, the batch always completes.

pub mod sample;

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::meilisearch::DocumentStore;
use crate::models::{ProteinRecord, WriteFailure, WriteTally};

pub use sample::generate_sample;

/// Outcome of a bulk import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total: usize,
    pub inserted_count: usize,
    pub failed_count: usize,
    pub success_rate: f64,
    /// First failures only (see [`crate::models::MAX_REPORTED_FAILURES`])
    pub failures: Vec<WriteFailure>,
}

impl From<WriteTally> for ImportSummary {
    fn from(tally: WriteTally) -> Self {
        Self {
            total: tally.total(),
            inserted_count: tally.succeeded,
            failed_count: tally.failed,
            success_rate: tally.success_rate(),
            failures: tally.failures,
        }
    }
}

/// Insert records one by one, never aborting on individual failures.
pub async fn import_records(
    store: &dyn DocumentStore,
    records: &[ProteinRecord],
) -> ImportSummary {
    let mut tally = WriteTally::default();
    for record in records {
        match store.insert_protein(record).await {
            Ok(()) => tally.record_success(),
            Err(e) => tally.record_failure(&record.protein_id, &e),
        }
    }

    tracing::info!(
        "Imported {}/{} proteins ({} failed)",
        tally.succeeded,
        tally.total(),
        tally.failed
    );
    tally.into()
}

/// Parse a JSON array of protein records.
pub fn parse_records(json: &str) -> Result<Vec<ProteinRecord>> {
    serde_json::from_str(json).context("Failed to parse protein records JSON")
}

/// Read and parse a JSON file of protein records.
pub fn load_records(path: &Path) -> Result<Vec<ProteinRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_records(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meilisearch::MockDocumentStore;
    use crate::models::MAX_REPORTED_FAILURES;
    use std::io::Write;

    #[tokio::test]
    async fn test_import_tallies_failures() {
        let store = MockDocumentStore::new().with_failing_write("P1").await;
        let records: Vec<ProteinRecord> = ["P0", "P1", "P2", "P3"]
            .into_iter()
            .map(ProteinRecord::new)
            .collect();

        let summary = import_records(&store, &records).await;

        assert_eq!(summary.total, 4);
        assert_eq!(summary.inserted_count, 3);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.success_rate, 0.75);
        assert_eq!(summary.failures[0].protein_id, "P1");
        assert!(store.get_protein("P3").await.unwrap().is_some());
        assert!(store.get_protein("P1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failure_sample_is_capped() {
        let mut store = MockDocumentStore::new();
        let mut records = Vec::new();
        for i in 0..15 {
            let id = format!("F{}", i);
            store = store.with_failing_write(&id).await;
            records.push(ProteinRecord::new(id));
        }

        let summary = import_records(&store, &records).await;
        assert_eq!(summary.failed_count, 15);
        assert_eq!(summary.failures.len(), MAX_REPORTED_FAILURES);
        assert_eq!(summary.success_rate, 0.0);
    }

    #[test]
    fn test_load_records_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"protein_id": "P12345", "name": "Kinase", "domain_ids": ["IPR000719"], "ec_numbers": ["2.7.11.1"]}},
                {{"protein_id": "Q99999", "status": "reviewed"}}]"#
        )
        .unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].domain_ids, vec!["IPR000719".to_string()]);
        assert!(records[1].ec_numbers.is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(parse_records("{not json").is_err());
    }
}
