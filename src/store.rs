//! Article store: SQLite persistence with an FTS5 full-text index.
//!
//! The store is append-only by contract — articles are inserted during
//! ingestion and never updated or deleted. Duplicate titles are tolerated
//! (source dumps are not deduplicated). All read paths bind user-supplied
//! terms as parameters; query terms are never interpolated into SQL.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::collections::HashSet;

use crate::models::{ArticleRecord, FtsHit, NewArticle};

/// Read operations the search engine depends on. The engine takes an
/// injected handle rather than reaching for a global connection, and tests
/// substitute a fake to exercise failure paths.
#[async_trait]
pub trait ArticleIndex: Send + Sync {
    /// Ranked full-text search over titles, content, and summaries.
    async fn full_text_search(&self, query: &str, limit: i64) -> Result<Vec<FtsHit>>;

    /// Case-insensitive exact title match.
    async fn exact_title_lookup(&self, term: &str) -> Result<Option<ArticleRecord>>;
}

/// Aggregate figures for `wdx stats`.
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    pub total_articles: i64,
    pub average_word_count: f64,
    pub min_word_count: i64,
    pub max_word_count: i64,
    pub total_distinct_categories: usize,
}

/// SQLite-backed article store.
#[derive(Clone)]
pub struct ArticleStore {
    pool: SqlitePool,
}

impl ArticleStore {
    pub fn new(pool: SqlitePool) -> Self {
        ArticleStore { pool }
    }

    /// Create the articles table, title index, and FTS5 table. Idempotent.
    pub async fn create_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                summary TEXT NOT NULL DEFAULT '',
                url TEXT NOT NULL,
                categories TEXT NOT NULL DEFAULT '[]',
                links TEXT NOT NULL DEFAULT '[]',
                word_count INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_title ON articles(title)")
            .execute(&self.pool)
            .await?;

        // FTS5 CREATE is not idempotent natively, so we check first
        let fts_exists: bool = sqlx::query_scalar(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='articles_fts'",
        )
        .fetch_one(&self.pool)
        .await?;

        if !fts_exists {
            sqlx::query(
                r#"
                CREATE VIRTUAL TABLE articles_fts USING fts5(
                    article_id UNINDEXED,
                    title,
                    content,
                    summary
                )
                "#,
            )
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Insert a batch of records in one transaction. The same two INSERT
    /// statements are reused for every record (sqlx keeps them prepared on
    /// the connection). `created_at` is assigned here.
    pub async fn batch_insert(&self, records: &[NewArticle]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for record in records {
            let categories_json = serde_json::to_string(&record.categories)?;
            let links_json = serde_json::to_string(&record.links)?;

            let result = sqlx::query(
                r#"
                INSERT INTO articles (title, content, summary, url, categories, links, word_count, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.title)
            .bind(&record.content)
            .bind(&record.summary)
            .bind(&record.url)
            .bind(&categories_json)
            .bind(&links_json)
            .bind(record.word_count)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            let article_id = result.last_insert_rowid();

            sqlx::query(
                "INSERT INTO articles_fts (article_id, title, content, summary) VALUES (?, ?, ?, ?)",
            )
            .bind(article_id)
            .bind(&record.title)
            .bind(&record.content)
            .bind(&record.summary)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Aggregate statistics over the whole store.
    pub async fn statistics(&self) -> Result<StoreStatistics> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_articles,
                COALESCE(AVG(word_count), 0.0) AS avg_word_count,
                COALESCE(MIN(word_count), 0) AS min_word_count,
                COALESCE(MAX(word_count), 0) AS max_word_count
            FROM articles
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        // Categories are stored as JSON arrays; distinct count requires a scan.
        let category_rows: Vec<String> = sqlx::query_scalar(
            "SELECT categories FROM articles WHERE categories != '[]' AND categories != ''",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut distinct: HashSet<String> = HashSet::new();
        for raw in &category_rows {
            if let Ok(categories) = serde_json::from_str::<Vec<String>>(raw) {
                distinct.extend(categories);
            }
        }

        Ok(StoreStatistics {
            total_articles: row.get("total_articles"),
            average_word_count: row.get("avg_word_count"),
            min_word_count: row.get("min_word_count"),
            max_word_count: row.get("max_word_count"),
            total_distinct_categories: distinct.len(),
        })
    }
}

#[async_trait]
impl ArticleIndex for ArticleStore {
    async fn full_text_search(&self, query: &str, limit: i64) -> Result<Vec<FtsHit>> {
        let Some(expression) = fts_match_expression(query) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            r#"
            SELECT a.title, a.content, a.summary,
                   snippet(articles_fts, 2, '', '', '...', 32) AS snippet
            FROM articles_fts
            JOIN articles a ON a.id = articles_fts.article_id
            WHERE articles_fts MATCH ?
            ORDER BY rank
            LIMIT ?
            "#,
        )
        .bind(&expression)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let hits = rows
            .iter()
            .map(|row| FtsHit {
                title: row.get("title"),
                content: row.get("content"),
                summary: row.get("summary"),
                snippet: row.get("snippet"),
            })
            .collect();

        Ok(hits)
    }

    async fn exact_title_lookup(&self, term: &str) -> Result<Option<ArticleRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, content, summary, url, categories, links, word_count, created_at
            FROM articles
            WHERE title = ? COLLATE NOCASE
            LIMIT 1
            "#,
        )
        .bind(term)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let categories: String = row.get("categories");
            let links: String = row.get("links");
            ArticleRecord {
                id: row.get("id"),
                title: row.get("title"),
                content: row.get("content"),
                summary: row.get("summary"),
                url: row.get("url"),
                categories: serde_json::from_str(&categories).unwrap_or_default(),
                links: serde_json::from_str(&links).unwrap_or_default(),
                word_count: row.get("word_count"),
                created_at: row.get("created_at"),
            }
        }))
    }
}

/// Normalize a free-form query into an FTS5 match expression.
///
/// Raw questions contain characters FTS5 treats as syntax (`?`, quotes,
/// hyphens), so the query is tokenized first: a single term matches as-is,
/// short queries match as a quoted phrase, longer ones as an AND of the
/// first five terms. Returns `None` when no word characters survive.
pub fn fts_match_expression(query: &str) -> Option<String> {
    let words: Vec<String> = query
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(|w| w.to_string())
        .collect();

    if words.is_empty() {
        return None;
    }

    if words.len() == 1 {
        Some(words[0].clone())
    } else if words.len() <= 3 {
        Some(format!("\"{}\"", words.join(" ")))
    } else {
        Some(words[..5.min(words.len())].join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewArticle;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    async fn memory_store() -> ArticleStore {
        // A single connection so every query sees the same :memory: database.
        let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        let store = ArticleStore::new(pool);
        store.create_schema().await.unwrap();
        store
    }

    fn article(title: &str, content: &str) -> NewArticle {
        NewArticle::from_parts(title.to_string(), content.to_string(), vec![], vec![], None)
    }

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let store = memory_store().await;
        store.create_schema().await.unwrap();
    }

    #[tokio::test]
    async fn batch_insert_tolerates_duplicate_titles() {
        let store = memory_store().await;
        store
            .batch_insert(&[
                article("Poland", "Poland is a country in Central Europe."),
                article("Poland", "A different article with the same title."),
            ])
            .await
            .unwrap();

        let stats = store.statistics().await.unwrap();
        assert_eq!(stats.total_articles, 2);
    }

    #[tokio::test]
    async fn exact_lookup_is_case_insensitive() {
        let store = memory_store().await;
        store
            .batch_insert(&[article("Machine Learning", "A field of study.")])
            .await
            .unwrap();

        let hit = store.exact_title_lookup("machine learning").await.unwrap();
        assert_eq!(hit.unwrap().title, "Machine Learning");

        let miss = store.exact_title_lookup("deep learning").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn full_text_search_finds_indexed_content() {
        let store = memory_store().await;
        store
            .batch_insert(&[
                article("Rust", "Rust is a systems programming language."),
                article("Python", "Python is an interpreted language."),
            ])
            .await
            .unwrap();

        let hits = store.full_text_search("systems", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Rust");
    }

    #[tokio::test]
    async fn search_survives_fts_syntax_characters() {
        let store = memory_store().await;
        store
            .batch_insert(&[article("Poland", "Poland is a country.")])
            .await
            .unwrap();

        // Raw questions carry '?' and quotes; the match expression must
        // neutralize them rather than error.
        let hits = store
            .full_text_search("What is \"Poland\"?", 10)
            .await
            .unwrap();
        assert!(!hits.is_empty());
    }

    #[tokio::test]
    async fn statistics_counts_distinct_categories() {
        let store = memory_store().await;
        let mut a = article("A", "one two three");
        a.categories = vec!["Science".to_string(), "History".to_string()];
        let mut b = article("B", "four five");
        b.categories = vec!["Science".to_string()];
        store.batch_insert(&[a, b]).await.unwrap();

        let stats = store.statistics().await.unwrap();
        assert_eq!(stats.total_articles, 2);
        assert_eq!(stats.total_distinct_categories, 2);
        assert!((stats.average_word_count - 2.5).abs() < 1e-9);
    }

    #[test]
    fn match_expression_forms() {
        assert_eq!(fts_match_expression("poland"), Some("poland".to_string()));
        assert_eq!(
            fts_match_expression("machine learning"),
            Some("\"machine learning\"".to_string())
        );
        assert_eq!(
            fts_match_expression("what is the capital of poland today"),
            Some("what AND is AND the AND capital AND of".to_string())
        );
        assert_eq!(fts_match_expression("?!"), None);
    }
}
