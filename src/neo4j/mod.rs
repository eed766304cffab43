//! Neo4j client and models for the protein similarity graph

pub mod client;
mod impl_graph_store;
pub mod mock;
pub mod models;
pub mod traits;

pub use client::Neo4jClient;
pub use mock::MockGraphStore;
pub use models::*;
pub use traits::GraphStore;
