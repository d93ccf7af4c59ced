//! # ragline CLI (`ragline`)
//!
//! The `ragline` binary is the primary interface for ragline. It
//! provides one-shot commands for document ingestion, search, and
//! question answering, plus the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! ragline --config ./config/ragline.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ragline serve` | Start the HTTP server |
//! | `ragline ingest <file>` | Chunk, embed, and index a document file |
//! | `ragline search "<query>"` | Similarity search over the index |
//! | `ragline ask "<question>"` | Answer a question from retrieved context |
//! | `ragline delete <document-id>` | Delete a document's records |
//! | `ragline compare <file>` | Compare all chunking strategies over a file |
//!
//! ## Examples
//!
//! ```bash
//! # Ingest a markdown document with the default strategy
//! ragline ingest docs/guide.md --id guide --title "User Guide"
//!
//! # Ingest with a specific chunking strategy
//! ragline ingest docs/api.md --strategy semantic
//!
//! # Search the index
//! ragline search "connection pooling" --top-k 3
//!
//! # Ask a question, restricted to one document
//! ragline ask "How do I configure retries?" --doc guide
//!
//! # Compare chunking strategies without touching the index
//! ragline compare docs/guide.md
//!
//! # Start the HTTP server
//! ragline serve --config ./config/ragline.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ragline::commands;
use ragline::config;
use ragline::server;

/// ragline CLI: a strategy-driven chunking, embedding, and
/// retrieval-augmented answering service for technical documentation.
///
/// All commands accept a `--config` flag pointing to a TOML
/// configuration file. See `config/ragline.example.toml` for a full
/// example. `compare` runs without a config file.
#[derive(Parser)]
#[command(
    name = "ragline",
    about = "ragline: strategy-driven chunking, embedding, and retrieval-augmented answering",
    version,
    long_about = "ragline chunks technical documents with a selectable strategy (fixed, markdown, \
    semantic, or hybrid), embeds every chunk, and indexes the vectors for similarity search and \
    retrieval-augmented question answering via a CLI and a JSON HTTP server."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/ragline.toml`. All server, embedding,
    /// index, generation, and retrieval settings are read from this
    /// file.
    #[arg(long, global = true, default_value = "./config/ragline.toml")]
    config: PathBuf,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to the address configured in `[server].bind` and serves
    /// the ingestion, search, ask, and compare endpoints.
    Serve,

    /// Chunk, embed, and index a document file.
    ///
    /// Reads the file, splits it with the selected strategy, embeds
    /// every chunk, and upserts the records into the vector index.
    Ingest {
        /// Path to the document file (markdown or plain text).
        file: PathBuf,

        /// Document id; defaults to the file stem.
        #[arg(long)]
        id: Option<String>,

        /// Document title; defaults to the file stem.
        #[arg(long)]
        title: Option<String>,

        /// Chunking strategy: `fixed`, `markdown`, `semantic`, or `hybrid`.
        #[arg(long, default_value = "markdown")]
        strategy: String,
    },

    /// Search indexed documents by similarity.
    ///
    /// Embeds the query and prints the top-k closest chunks with
    /// scores and excerpts.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return.
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Answer a question from retrieved context.
    ///
    /// Retrieves the closest chunks, synthesizes an answer with the
    /// generation backend, and prints it with its sources. Requires
    /// `[generation].provider` to be configured.
    Ask {
        /// The question to answer.
        question: String,

        /// Restrict retrieval to this document id (repeatable).
        #[arg(long = "doc")]
        document_ids: Vec<String>,
    },

    /// Delete a document's records from the index.
    ///
    /// Best-effort: deleting a document that was never ingested still
    /// reports completion.
    Delete {
        /// Document id whose records should be removed.
        document_id: String,
    },

    /// Compare all chunking strategies over a document file.
    ///
    /// Runs every strategy and prints per-strategy chunk statistics.
    /// Pure chunking: no config file or backends required.
    Compare {
        /// Path to the document file.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Commands that don't require config
    if let Commands::Compare { file } = &cli.command {
        commands::run_compare(file)?;
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Ingest {
            file,
            id,
            title,
            strategy,
        } => {
            commands::run_ingest(&cfg, &file, id, title, &strategy).await?;
        }
        Commands::Search { query, top_k } => {
            commands::run_search(&cfg, &query, top_k).await?;
        }
        Commands::Ask {
            question,
            document_ids,
        } => {
            commands::run_ask(&cfg, &question, document_ids).await?;
        }
        Commands::Delete { document_id } => {
            commands::run_delete(&cfg, &document_id).await?;
        }
        Commands::Compare { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
