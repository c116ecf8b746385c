//! # wikidex CLI (`wdx`)
//!
//! The `wdx` binary is the primary interface for wikidex. It provides
//! commands for database initialization, dump ingestion, question-answering
//! search, article retrieval, and database statistics.
//!
//! ## Usage
//!
//! ```bash
//! wdx --config ./config/wdx.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `wdx init` | Create the SQLite database and FTS5 tables |
//! | `wdx datasets` | List the downloadable dump packages |
//! | `wdx ingest <dataset>` | Download, parse, and index a dump |
//! | `wdx search "<question>"` | Answer a question with ranked articles |
//! | `wdx ask "<question>"` | Search plus generated answer (if configured) |
//! | `wdx get <title>` | Print one article by exact title |
//! | `wdx stats` | Show article counts and coverage |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the database
//! wdx init --config ./config/wdx.toml
//!
//! # Index the smallest dump
//! wdx ingest minimal --config ./config/wdx.toml
//!
//! # Index a pre-downloaded dump file
//! wdx ingest standard --input ./dumps/simplewiki.json.gz
//!
//! # Ask a question and show the trace log
//! wdx search "Why is the sky blue?" --trace
//!
//! # Machine-readable output
//! wdx search "Why is the sky blue?" --json
//! ```

mod ask;
mod config;
mod context;
mod datasets;
mod db;
mod download;
mod engine;
mod generator;
mod get;
mod ingest;
mod migrate;
mod models;
mod parse;
mod planner;
mod progress;
mod search;
mod stats;
mod store;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use progress::{CancelToken, ProgressMode};

/// wikidex CLI — an offline encyclopedia with question-answering search.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/wdx.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "wdx",
    about = "wikidex — an offline encyclopedia with question-answering search",
    version,
    long_about = "wikidex downloads a Wikipedia dump once, indexes it into SQLite FTS5, \
    and answers natural-language questions against the local index: keyword extraction, \
    query expansion, exact-title matching, and score fusion, all without a network."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/wdx.toml`. Database, ingestion, retrieval,
    /// and generator settings are read from this file.
    #[arg(long, global = true, default_value = "./config/wdx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file, the articles table, the title
    /// index, and the FTS5 virtual table. This command is idempotent —
    /// running it multiple times is safe.
    Init,

    /// List the downloadable dump packages.
    ///
    /// Shows the fixed dataset registry with approximate download sizes
    /// and article counts.
    Datasets,

    /// Download, parse, and index a dump.
    ///
    /// Fetches the dataset's gzip dump (or reads a local file with
    /// `--input`), decompresses it in memory, parses the records, and
    /// stores them in batches. Progress is reported on stderr.
    Ingest {
        /// Dataset key: `minimal`, `standard`, or `full`.
        dataset: String,

        /// Read the compressed dump from a local file instead of
        /// downloading it.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Stop after storing this many articles.
        #[arg(long)]
        limit: Option<usize>,

        /// Suppress progress output.
        #[arg(long, conflicts_with = "progress_json")]
        no_progress: bool,

        /// Emit progress as JSON lines on stderr.
        #[arg(long)]
        progress_json: bool,
    },

    /// Answer a question with ranked articles.
    ///
    /// Expands the question into several search queries, fuses the results,
    /// pins exact title matches at full relevance, and prints the ranked
    /// articles with scores and URLs.
    Search {
        /// The question to answer.
        question: String,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<i64>,

        /// Print the timestamped trace log after the results.
        #[arg(long)]
        trace: bool,

        /// Emit the full response (results, trace, total_found) as JSON.
        #[arg(long, conflicts_with = "trace")]
        json: bool,
    },

    /// Search and generate an answer from the matching articles.
    ///
    /// Assembles a context block from the top results and, when a
    /// generator backend is configured, asks it for an answer grounded in
    /// that context. Without a generator the context itself is printed.
    Ask {
        /// The question to answer.
        question: String,
    },

    /// Print one article by exact title (case-insensitive).
    Get {
        /// Article title.
        title: String,
    },

    /// Show database statistics.
    ///
    /// Article count, word-count spread, category coverage, and file size.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `datasets` needs no config or database.
    if let Commands::Datasets = cli.command {
        datasets::list_datasets();
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Datasets => unreachable!(),
        Commands::Ingest {
            dataset,
            input,
            limit,
            no_progress,
            progress_json,
        } => {
            let mode = if no_progress {
                ProgressMode::Off
            } else if progress_json {
                ProgressMode::Json
            } else {
                ProgressMode::default_for_tty()
            };
            let reporter = mode.reporter();

            let cancel = CancelToken::new();
            let ctrl_c_cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrl_c_cancel.cancel();
                }
            });

            ingest::run_ingest(
                &cfg,
                &dataset,
                input.as_deref(),
                limit,
                reporter.as_ref(),
                &cancel,
            )
            .await?;
        }
        Commands::Search {
            question,
            limit,
            trace,
            json,
        } => {
            search::run_search(&cfg, &question, limit, json, trace).await?;
        }
        Commands::Ask { question } => {
            ask::run_ask(&cfg, &question).await?;
        }
        Commands::Get { title } => {
            get::run_get(&cfg, &title).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
