//! Protein Annotator
//!
//! Infers missing functional annotations for proteins:
//! - Similarity graph built from shared InterPro domains (Jaccard weights)
//! - Label propagation of EC numbers / GO terms across that graph
//! - Holdout evaluation and coverage statistics
//! - Neo4j as graph store, Meilisearch as document store

pub mod annotation;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod meilisearch;
pub mod models;
pub mod neo4j;

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use annotation::{AnnotationService, PropagationRequest, UpdatePolicy};
use graph::SimilarityGraphEngine;

// ============================================================================
// config.yaml sections
// ============================================================================

/// Contents of `config.yaml`; every section may be omitted
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub neo4j: Neo4jYamlConfig,
    pub meilisearch: MeilisearchYamlConfig,
    pub annotation: AnnotationYamlConfig,
}

/// Graph store connection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "password".into(),
        }
    }
}

/// Document store connection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MeilisearchYamlConfig {
    pub url: String,
    /// Empty means no API key
    pub key: String,
}

impl Default for MeilisearchYamlConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:7700".into(),
            key: String::new(),
        }
    }
}

/// Default propagation parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnnotationYamlConfig {
    pub max_iterations: usize,
    pub threshold: f64,
    pub min_similarity: f64,
    pub policy: UpdatePolicy,
}

impl Default for AnnotationYamlConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            threshold: 0.01,
            min_similarity: 0.1,
            policy: UpdatePolicy::Union,
        }
    }
}

// ============================================================================
// Resolved config
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub meilisearch_url: String,
    pub meilisearch_key: String,
    pub max_iterations: usize,
    pub threshold: f64,
    pub min_similarity: f64,
    pub policy: UpdatePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Priority: env var > YAML file > built-in default.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            meilisearch_url: std::env::var("MEILISEARCH_URL").unwrap_or(yaml.meilisearch.url),
            meilisearch_key: std::env::var("MEILISEARCH_KEY").unwrap_or(yaml.meilisearch.key),
            max_iterations: env_parsed("ANNOTATION_MAX_ITERATIONS")
                .unwrap_or(yaml.annotation.max_iterations),
            threshold: env_parsed("ANNOTATION_THRESHOLD").unwrap_or(yaml.annotation.threshold),
            min_similarity: env_parsed("ANNOTATION_MIN_SIMILARITY")
                .unwrap_or(yaml.annotation.min_similarity),
            policy: yaml.annotation.policy,
        })
    }

    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Using config file {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Ignoring unparseable {}: {}", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "{} not found, using environment and defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }

    /// Propagation request for `attribute` with the configured defaults.
    pub fn propagation_request(&self, attribute: &str) -> PropagationRequest {
        PropagationRequest {
            attribute: attribute.to_string(),
            max_iterations: self.max_iterations,
            threshold: self.threshold,
            min_similarity: self.min_similarity,
            policy: self.policy,
        }
    }
}

fn env_parsed<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.parse().ok())
}

// ============================================================================
// Application state
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub graph: Arc<dyn neo4j::GraphStore>,
    pub documents: Arc<dyn meilisearch::DocumentStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect to Neo4j and Meilisearch; either being unreachable is fatal.
    pub async fn new(config: Config) -> Result<Self> {
        let graph = Arc::new(
            neo4j::Neo4jClient::new(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password)
                .await?,
        );

        let documents = Arc::new(
            meilisearch::MeiliClient::new(&config.meilisearch_url, &config.meilisearch_key).await?,
        );

        Ok(Self {
            graph,
            documents,
            config: Arc::new(config),
        })
    }

    /// In-memory stores, nothing persisted.
    pub fn offline(config: Config) -> Self {
        Self {
            graph: Arc::new(neo4j::MockGraphStore::new()),
            documents: Arc::new(meilisearch::MockDocumentStore::new()),
            config: Arc::new(config),
        }
    }

    pub fn similarity_engine(&self) -> SimilarityGraphEngine {
        SimilarityGraphEngine::new(self.documents.clone(), self.graph.clone())
    }

    pub fn annotation_service(&self) -> AnnotationService {
        AnnotationService::new(self.graph.clone(), self.documents.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================
