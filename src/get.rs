//! Single-article retrieval by title.
//!
//! Fetches one article via the case-insensitive exact-title lookup and
//! prints it. Used by `wdx get <title>`.

use anyhow::Result;

use crate::config::Config;
use crate::db;
use crate::store::{ArticleIndex, ArticleStore};

/// CLI entry point: look up an article by exact title and print it.
pub async fn run_get(config: &Config, title: &str) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = ArticleStore::new(pool.clone());

    let article = store.exact_title_lookup(title).await?;
    pool.close().await;

    let article = match article {
        Some(a) => a,
        None => {
            eprintln!("Error: no article titled '{}'", title);
            std::process::exit(1);
        }
    };

    println!("--- Article ---");
    println!("title:      {}", article.title);
    println!("url:        {}", article.url);
    println!("words:      {}", article.word_count);
    println!("ingested:   {}", format_ts_iso(article.created_at));
    if !article.categories.is_empty() {
        println!("categories: {}", article.categories.join(", "));
    }
    if !article.links.is_empty() {
        println!("links:      {}", article.links.len());
    }
    println!();

    println!("--- Summary ---");
    println!("{}", article.summary);
    println!();

    println!("--- Content ---");
    println!("{}", article.content);

    Ok(())
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}
