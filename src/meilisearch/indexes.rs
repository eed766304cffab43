//! Index definitions for Meilisearch

use serde::{Deserialize, Serialize};

/// Fields fetched for similarity computation and graph construction
/// (the serialized form of [`crate::models::ProteinProjection`]).
pub const PROJECTION_FIELDS: [&str; 7] = [
    "protein_id",
    "name",
    "status",
    "taxonomy_id",
    "domain_ids",
    "ec_numbers",
    "go_terms",
];

pub const SEARCHABLE_FIELDS: [&str; 4] = ["protein_id", "name", "description", "taxonomy_name"];

pub const FILTERABLE_FIELDS: [&str; 5] =
    ["status", "taxonomy_id", "domain_ids", "ec_numbers", "go_terms"];

/// Page size used when scanning the whole protein index
pub const SCAN_BATCH: usize = 1000;

/// Document counts for the protein index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub total_documents: usize,
    pub is_indexing: bool,
}

/// Index names
pub mod index_names {
    pub const PROTEINS: &str = "proteins";
}

/// Primary key of the protein index
pub const PRIMARY_KEY: &str = "protein_id";
