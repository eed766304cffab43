//! Protein similarity graph.
//!
//! Builds an undirected graph whose edges connect proteins sharing domains,
//! weighted by Jaccard similarity, and answers similarity and connectivity
//! queries over it.
//!
//! ## Architecture
//!
//! ```text
//! DocumentStore ──► projections ──► DomainIndex (domain → proteins)
//!                                        │
//!                                   algorithms (bucket pair enumeration)
//!                                        │
//!                                 Vec<SimilarityEdge>
//!                                        │
//!                                    writer ──► GraphStore (clear + repopulate)
//!
//! GraphStore ──► extraction ──► petgraph::UnGraph ──► topology
//! ```
//!
//! ## Modules
//!
//! - [`models`]: Data structures (DomainProfile, DomainIndex, PairKey, SimilarityEdge, reports)
//! - [`algorithms`]: Jaccard, inverted index, pairwise similarity, similarity queries
//! - [`extraction`]: GraphStore → petgraph conversion
//! - [`topology`]: Connected components and clustering coefficient
//! - [`writer`]: Full rebuild of the graph store
//! - [`engine`]: `SimilarityGraphEngine` orchestrator

pub mod algorithms;
pub mod engine;
pub mod extraction;
pub mod models;
pub mod topology;
pub mod writer;

pub use engine::SimilarityGraphEngine;
pub use models::{
    BuildGraphRequest, BuildReport, ConnectivityReport, DomainDistribution, DomainIndex,
    DomainProfile, GraphStatistics, PairKey, SimilarProtein, SimilarityEdge,
};
