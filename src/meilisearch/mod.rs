//! Meilisearch client and index management for protein records

pub mod client;
mod impl_document_store;
pub mod indexes;
pub mod mock;
pub mod traits;

pub use client::MeiliClient;
pub use mock::MockDocumentStore;
pub use traits::DocumentStore;
