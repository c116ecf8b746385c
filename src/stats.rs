//! Database statistics overview.
//!
//! Gives a quick summary of what's indexed: article count, word-count
//! spread, and category coverage. Used by `wdx stats` to confirm an
//! ingestion landed as expected.

use anyhow::Result;

use crate::config::Config;
use crate::db;
use crate::progress::format_bytes;
use crate::store::ArticleStore;

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = ArticleStore::new(pool.clone());
    let stats = store.statistics().await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("wikidex — Database Stats");
    println!("========================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Articles:    {}", stats.total_articles);
    println!("  Avg words:   {:.1}", stats.average_word_count);
    println!(
        "  Word range:  {} – {}",
        stats.min_word_count, stats.max_word_count
    );
    println!("  Categories:  {}", stats.total_distinct_categories);
    println!();

    pool.close().await;
    Ok(())
}
