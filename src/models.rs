//! Core data models used throughout wikidex.
//!
//! These types represent the articles, search candidates, and trace log
//! entries that flow through the ingestion and question-answering pipeline.

use serde::Serialize;

/// Maximum number of characters of body text carried into an article summary.
pub const SUMMARY_CHARS: usize = 500;

/// A parsed article ready for insertion. The store assigns `id` and
/// `created_at` when the record is written.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub url: String,
    pub categories: Vec<String>,
    pub links: Vec<String>,
    pub word_count: i64,
}

impl NewArticle {
    /// Build a record from raw dump fields. The summary is derived from the
    /// first [`SUMMARY_CHARS`] characters of the content, and the URL falls
    /// back to the canonical encyclopedia URL for the title when the dump
    /// did not carry one.
    pub fn from_parts(
        title: String,
        content: String,
        categories: Vec<String>,
        links: Vec<String>,
        url: Option<String>,
    ) -> Self {
        let summary = make_summary(&content);
        let word_count = content.split_whitespace().count() as i64;
        let url = url.unwrap_or_else(|| article_url(&title));
        NewArticle {
            title,
            content,
            summary,
            url,
            categories,
            links,
            word_count,
        }
    }
}

/// An article row as stored in SQLite. Rows are append-only: once written
/// they are never updated or deleted. Titles are not unique.
#[derive(Debug, Clone)]
pub struct ArticleRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub url: String,
    pub categories: Vec<String>,
    pub links: Vec<String>,
    pub word_count: i64,
    pub created_at: i64,
}

/// A full-text search hit returned by the store, ordered by FTS5 rank.
#[derive(Debug, Clone)]
pub struct FtsHit {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub snippet: String,
}

/// A scored candidate produced by result fusion. Transient per question.
#[derive(Debug, Clone, Serialize)]
pub struct SearchCandidate {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub relevance_score: f64,
    pub url: String,
}

/// Classification of a trace log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Search,
    Sql,
    Review,
    Result,
    Error,
}

/// One line of the search trace. Append order is chronological order;
/// lines are never reordered or mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct LogLine {
    pub kind: LogKind,
    pub message: String,
    pub timestamp: i64,
}

impl LogLine {
    pub fn new(kind: LogKind, message: impl Into<String>) -> Self {
        LogLine {
            kind,
            message: message.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// One completed search recorded in the engine's session history.
#[derive(Debug, Clone, Serialize)]
pub struct QueryLogEntry {
    pub question: String,
    pub generated_queries: Vec<String>,
    pub results: Vec<SearchCandidate>,
    pub search_log: Vec<LogLine>,
    pub timestamp: i64,
}

/// Response shape returned by the search engine. On fatal failure the
/// results are empty and `error` carries the cause; callers never need to
/// special-case "no results" against "error".
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchCandidate>,
    pub status_log: Vec<LogLine>,
    pub total_found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// First [`SUMMARY_CHARS`] characters of the content, on a char boundary.
pub fn make_summary(content: &str) -> String {
    content.chars().take(SUMMARY_CHARS).collect()
}

/// Canonical encyclopedia URL for a title: spaces become underscores and
/// the result is percent-encoded.
pub fn article_url(title: &str) -> String {
    let slug = title.trim().replace(' ', "_");
    format!("https://en.wikipedia.org/wiki/{}", urlencoding::encode(&slug))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_truncates_to_500_chars() {
        let content = "x".repeat(1200);
        assert_eq!(make_summary(&content).chars().count(), 500);
        assert_eq!(make_summary("short"), "short");
    }

    #[test]
    fn summary_respects_char_boundaries() {
        let content = "é".repeat(600);
        let summary = make_summary(&content);
        assert_eq!(summary.chars().count(), 500);
    }

    #[test]
    fn article_url_encodes_title() {
        assert_eq!(
            article_url("Artificial Intelligence"),
            "https://en.wikipedia.org/wiki/Artificial_Intelligence"
        );
        assert_eq!(article_url("AC/DC"), "https://en.wikipedia.org/wiki/AC%2FDC");
    }

    #[test]
    fn from_parts_derives_fields() {
        let rec = NewArticle::from_parts(
            "Poland".to_string(),
            "Poland is a country in Central Europe.".to_string(),
            vec!["Countries".to_string()],
            vec![],
            None,
        );
        assert_eq!(rec.word_count, 7);
        assert_eq!(rec.summary, rec.content);
        assert_eq!(rec.url, "https://en.wikipedia.org/wiki/Poland");
    }
}
