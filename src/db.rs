//! SQLite connection handling.
//!
//! One pool per command invocation. Ingestion writes in batched
//! transactions from a single task and search issues short read queries,
//! so a small WAL pool covers both; `busy_timeout` absorbs the case where
//! a read lands while an ingestion transaction holds the write lock.

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use crate::config::Config;

/// Open the article database at `[db].path`, creating the file and any
/// missing parent directories.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("failed to create database directory {}", parent.display())
        })?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbConfig;

    fn config_at(path: std::path::PathBuf) -> Config {
        Config {
            db: DbConfig { path },
            ingest: Default::default(),
            retrieval: Default::default(),
            generator: Default::default(),
        }
    }

    #[tokio::test]
    async fn connect_creates_file_and_parent_dirs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("data").join("wdx.sqlite");
        let config = config_at(path.clone());

        let pool = connect(&config).await.unwrap();
        let one: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(one, 1);
        pool.close().await;

        assert!(path.exists());
    }
}
