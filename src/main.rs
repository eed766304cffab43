//! Protein Annotator - command line entry point
//!
//! Every subcommand prints its result as pretty JSON on stdout; logs go to
//! stderr through `tracing`.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use protein_annotator::annotation::UpdatePolicy;
use protein_annotator::graph::BuildGraphRequest;
use protein_annotator::ingest::{generate_sample, import_records, load_records};
use protein_annotator::neo4j::GraphStore;
use protein_annotator::{AppState, Config};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Proteins generated into the in-memory stores for `--offline` runs.
const OFFLINE_SAMPLE_SIZE: usize = 200;
const OFFLINE_SAMPLE_SEED: u64 = 42;

#[derive(Parser)]
#[command(name = "protein-annotator")]
#[command(about = "Protein function annotation by domain similarity and label propagation")]
struct Cli {
    /// Path to config.yaml (defaults to ./config.yaml)
    #[arg(long, global = true, env = "ANNOTATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Use in-memory stores seeded with sample data instead of Neo4j/Meilisearch
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import protein records from a JSON array file
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Generate and import synthetic protein records
    Sample {
        #[arg(short, long, default_value = "1000")]
        count: usize,

        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// Rebuild the similarity graph from the document store
    BuildGraph {
        #[arg(long)]
        min_similarity: Option<f64>,

        #[arg(long)]
        max_proteins: Option<usize>,
    },

    /// Propagate labels over the similarity graph and write them back
    Propagate {
        /// "ec" or "go"
        #[arg(short, long)]
        attribute: String,

        #[arg(long)]
        max_iterations: Option<usize>,

        #[arg(long)]
        threshold: Option<f64>,

        /// "union" or "majority"
        #[arg(long)]
        policy: Option<String>,
    },

    /// Holdout evaluation of propagation quality
    Evaluate {
        #[arg(short, long)]
        attribute: String,

        /// RNG seed for a reproducible holdout sample
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Annotation coverage statistics for one attribute
    Stats {
        #[arg(short, long)]
        attribute: String,
    },

    /// Annotation statistics for both attributes
    Overview,

    /// Node/edge totals, density and connectivity of the graph
    GraphStats,

    /// Proteins most similar to the given one
    Similar {
        #[arg(short, long)]
        protein: String,

        #[arg(long, default_value = "10")]
        top_k: usize,

        #[arg(long, default_value = "0.0")]
        min_similarity: f64,
    },

    /// Pairwise similarity matrix for the listed proteins
    Matrix {
        #[arg(required = true)]
        proteins: Vec<String>,
    },

    /// Domain frequency distribution
    Domains,

    /// Neighbourhood subgraph around a protein
    Neighbors {
        #[arg(short, long)]
        protein: String,

        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=3))]
        depth: u8,
    },

    /// Search proteins by id or name
    Search {
        #[arg(short, long)]
        query: String,

        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Delete the whole similarity graph
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,protein_annotator=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_yaml_and_env(cli.config.as_deref())?;

    let state = if cli.offline {
        offline_state(config).await?
    } else {
        let state = AppState::new(config).await?;
        tracing::info!("Connected to databases");
        state
    };

    run(&state, cli.command).await
}

async fn offline_state(config: Config) -> Result<AppState> {
    let state = AppState::offline(config);
    let records = generate_sample(OFFLINE_SAMPLE_SIZE, OFFLINE_SAMPLE_SEED);
    import_records(state.documents.as_ref(), &records).await;
    let request = BuildGraphRequest {
        min_similarity: state.config.min_similarity,
        max_proteins: None,
    };
    state.similarity_engine().build_graph(&request).await?;
    tracing::info!(
        "Offline mode: {} sample proteins in memory, nothing is persisted",
        OFFLINE_SAMPLE_SIZE
    );
    Ok(state)
}

async fn run(state: &AppState, command: Commands) -> Result<()> {
    match command {
        Commands::Import { file } => {
            let records = load_records(&file)?;
            print_json(&import_records(state.documents.as_ref(), &records).await)
        }
        Commands::Sample { count, seed } => {
            let records = generate_sample(count, seed);
            print_json(&import_records(state.documents.as_ref(), &records).await)
        }
        Commands::BuildGraph {
            min_similarity,
            max_proteins,
        } => {
            let request = BuildGraphRequest {
                min_similarity: min_similarity.unwrap_or(state.config.min_similarity),
                max_proteins,
            };
            print_json(&state.similarity_engine().build_graph(&request).await?)
        }
        Commands::Propagate {
            attribute,
            max_iterations,
            threshold,
            policy,
        } => {
            let mut request = state.config.propagation_request(&attribute);
            if let Some(max_iterations) = max_iterations {
                request.max_iterations = max_iterations;
            }
            if let Some(threshold) = threshold {
                request.threshold = threshold;
            }
            if let Some(policy) = policy {
                request.policy = policy.parse::<UpdatePolicy>()?;
            }
            print_json(&state.annotation_service().propagate_labels(&request).await?)
        }
        Commands::Evaluate { attribute, seed } => print_json(
            &state
                .annotation_service()
                .evaluate_quality(&attribute, seed)
                .await?,
        ),
        Commands::Stats { attribute } => {
            print_json(&state.annotation_service().statistics(&attribute).await?)
        }
        Commands::Overview => print_json(&state.annotation_service().overview().await?),
        Commands::GraphStats => print_json(&state.similarity_engine().graph_statistics().await?),
        Commands::Similar {
            protein,
            top_k,
            min_similarity,
        } => print_json(
            &state
                .similarity_engine()
                .find_similar(&protein, top_k, min_similarity)
                .await?,
        ),
        Commands::Matrix { proteins } => {
            print_json(&state.similarity_engine().similarity_matrix(&proteins).await?)
        }
        Commands::Domains => print_json(&state.similarity_engine().domain_distribution().await?),
        Commands::Neighbors { protein, depth } => {
            print_json(&state.graph.neighborhood(&protein, depth as usize).await?)
        }
        Commands::Search { query, limit } => {
            print_json(&state.graph.search_proteins(&query, limit).await?)
        }
        Commands::Clear => {
            state.graph.clear().await?;
            tracing::info!("Similarity graph cleared");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
