//! The `wdx search` command: multi-query question answering search.
//!
//! Builds a [`SearchEngine`] over the SQLite store, runs one question, and
//! prints the ranked articles. `--json` emits the full response object
//! (results, trace log, total_found) on stdout; `--trace` appends the
//! human-readable trace log after the result list.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::db;
use crate::engine::SearchEngine;
use crate::models::{LogKind, SearchResponse};
use crate::store::ArticleStore;

pub async fn run_search(
    config: &Config,
    question: &str,
    limit: Option<i64>,
    json: bool,
    trace: bool,
) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = ArticleStore::new(pool.clone());
    let mut engine = SearchEngine::new(store, config.retrieval.per_query_limit);

    let final_limit = limit.unwrap_or(config.retrieval.final_limit).max(1);
    let response = engine.search(question, final_limit).await;
    pool.close().await;

    if json {
        let body = serde_json::to_string_pretty(&response)
            .context("failed to serialize search response")?;
        println!("{}", body);
        return Ok(());
    }

    print_response(&response, trace);

    if response.error.is_some() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_response(response: &SearchResponse, trace: bool) {
    if let Some(ref err) = response.error {
        eprintln!("Error: {}", err);
    } else if response.results.is_empty() {
        println!("No results.");
    } else {
        for (i, result) in response.results.iter().enumerate() {
            println!("{}. [{:.2}] {}", i + 1, result.relevance_score, result.title);
            println!("   {}", result.url);
            let snippet: String = result.summary.chars().take(160).collect();
            if !snippet.is_empty() {
                println!("   {}", snippet.replace('\n', " "));
            }
            println!();
        }
        println!(
            "{} shown of {} matched",
            response.results.len(),
            response.total_found
        );
    }

    if trace {
        println!();
        println!("--- Trace ---");
        for line in &response.status_log {
            let ts = chrono::DateTime::from_timestamp(line.timestamp, 0)
                .map(|dt| dt.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| line.timestamp.to_string());
            println!("{}  {:<7} {}", ts, kind_label(line.kind), line.message);
        }
    }
}

fn kind_label(kind: LogKind) -> &'static str {
    match kind {
        LogKind::Search => "search",
        LogKind::Sql => "sql",
        LogKind::Review => "review",
        LogKind::Result => "result",
        LogKind::Error => "error",
    }
}
