use anyhow::Result;

use crate::config::Config;
use crate::db;
use crate::store::ArticleStore;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = ArticleStore::new(pool.clone());
    store.create_schema().await?;
    pool.close().await;
    Ok(())
}
