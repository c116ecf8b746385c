//! Multi-query search: execution, fusion, scoring, and relevance review.
//!
//! For each question the engine runs every generated query against the
//! full-text index, then every extracted keyword against the exact-title
//! lookup, always in that fixed order so trace logs are deterministic.
//! Results are fused into a title-keyed candidate set (exact matches
//! overwrite fuzzy entries and are pinned at relevance 1.0), sorted, and
//! reviewed against a score threshold before being returned with the
//! trace log.

use anyhow::Result;
use std::collections::HashMap;

use crate::models::{
    article_url, make_summary, LogKind, LogLine, QueryLogEntry, SearchCandidate, SearchResponse,
};
use crate::planner;
use crate::store::ArticleIndex;

/// Candidates scoring below this after review are dropped.
pub const REVIEW_THRESHOLD: f64 = 0.05;

/// Score added per question keyword relating to a title keyword. Title
/// matches are weighted five times content matches, favoring precise
/// topical matches over incidental co-occurrence.
const TITLE_MATCH_WEIGHT: f64 = 0.5;
const CONTENT_MATCH_WEIGHT: f64 = 0.1;

/// One entry of the fusion map before review.
#[derive(Debug, Clone)]
struct FusedCandidate {
    title: String,
    content: String,
    summary: String,
    score: f64,
    exact: bool,
}

/// Search engine over an injected article index. Holds the append-only
/// session history of completed searches.
pub struct SearchEngine<S: ArticleIndex> {
    store: S,
    per_query_limit: i64,
    history: Vec<QueryLogEntry>,
}

impl<S: ArticleIndex> SearchEngine<S> {
    pub fn new(store: S, per_query_limit: i64) -> Self {
        SearchEngine {
            store,
            per_query_limit,
            history: Vec::new(),
        }
    }

    /// Answer a question with up to `limit` ranked articles. Fatal errors
    /// are converted into a structured error response rather than
    /// propagated; per-query store errors degrade to zero results for
    /// that query and one `error` trace line.
    pub async fn search(&mut self, question: &str, limit: i64) -> SearchResponse {
        let mut log: Vec<LogLine> = Vec::new();

        match self.search_inner(question, limit, &mut log).await {
            Ok((results, generated_queries, total_found)) => {
                self.history.push(QueryLogEntry {
                    question: question.to_string(),
                    generated_queries,
                    results: results.clone(),
                    search_log: log.clone(),
                    timestamp: chrono::Utc::now().timestamp(),
                });
                SearchResponse {
                    results,
                    status_log: log,
                    total_found,
                    error: None,
                }
            }
            Err(e) => {
                log.push(LogLine::new(
                    LogKind::Error,
                    format!("search failed: {}", e),
                ));
                SearchResponse {
                    results: Vec::new(),
                    status_log: log,
                    total_found: 0,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn search_inner(
        &self,
        question: &str,
        limit: i64,
        log: &mut Vec<LogLine>,
    ) -> Result<(Vec<SearchCandidate>, Vec<String>, usize)> {
        let queries = planner::generate_queries(question);
        let keywords = planner::extract_keywords(question);

        log.push(LogLine::new(
            LogKind::Search,
            format!("generated {} search queries", queries.len()),
        ));

        // Fusion map: insertion order is preserved for tie-breaking, the
        // index gives title-keyed deduplication.
        let mut fused: Vec<FusedCandidate> = Vec::new();
        let mut by_title: HashMap<String, usize> = HashMap::new();

        // All fuzzy queries first, in generation order.
        for query in &queries {
            log.push(LogLine::new(
                LogKind::Search,
                format!("searching with query: '{}'", query),
            ));
            log.push(LogLine::new(
                LogKind::Sql,
                format!("full-text search: '{}' limit {}", query, self.per_query_limit),
            ));

            match self.store.full_text_search(query, self.per_query_limit).await {
                Ok(hits) => {
                    log.push(LogLine::new(
                        LogKind::Result,
                        format!("found {} articles for query '{}'", hits.len(), query),
                    ));
                    for hit in hits {
                        if by_title.contains_key(&hit.title) {
                            continue;
                        }
                        let score = relevance_score(question, &hit.title, &hit.content);
                        by_title.insert(hit.title.clone(), fused.len());
                        fused.push(FusedCandidate {
                            title: hit.title,
                            content: hit.content,
                            summary: hit.summary,
                            score,
                            exact: false,
                        });
                    }
                }
                Err(e) => {
                    // One failed query contributes zero results; the
                    // overall search continues.
                    log.push(LogLine::new(
                        LogKind::Error,
                        format!("query '{}' failed: {}", query, e),
                    ));
                }
            }
        }

        // Then all exact-title lookups, in keyword-extraction order. An
        // exact match always overwrites the fuzzy entry at its title.
        for keyword in &keywords {
            log.push(LogLine::new(
                LogKind::Sql,
                format!("exact title lookup: '{}'", keyword),
            ));
            match self.store.exact_title_lookup(keyword).await {
                Ok(Some(article)) => {
                    log.push(LogLine::new(
                        LogKind::Result,
                        format!("exact title match: '{}'", article.title),
                    ));
                    let candidate = FusedCandidate {
                        title: article.title.clone(),
                        content: article.content,
                        summary: article.summary,
                        score: 1.0,
                        exact: true,
                    };
                    match by_title.get(&article.title) {
                        Some(&i) => fused[i] = candidate,
                        None => {
                            by_title.insert(article.title, fused.len());
                            fused.push(candidate);
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    log.push(LogLine::new(
                        LogKind::Error,
                        format!("exact lookup '{}' failed: {}", keyword, e),
                    ));
                }
            }
        }

        // total_found reports the pre-review fusion map size.
        let total_found = fused.len();

        // Stable descending sort: ties keep first-insertion order.
        fused.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // Review the top candidates. Exact matches stay pinned at 1.0 and
        // are never re-scored.
        let mut results: Vec<SearchCandidate> = Vec::new();
        for candidate in fused.into_iter().take(limit.max(0) as usize) {
            log.push(LogLine::new(
                LogKind::Review,
                format!("reviewing article '{}'", candidate.title),
            ));

            let final_score = if candidate.exact {
                1.0
            } else {
                relevance_score(question, &candidate.title, &candidate.content)
            };

            if final_score < REVIEW_THRESHOLD {
                log.push(LogLine::new(
                    LogKind::Review,
                    format!("article '{}' not relevant to question", candidate.title),
                ));
                continue;
            }

            log.push(LogLine::new(
                LogKind::Review,
                format!(
                    "article '{}' deemed relevant (score: {:.2})",
                    candidate.title, final_score
                ),
            ));
            results.push(SearchCandidate {
                url: article_url(&candidate.title),
                title: candidate.title,
                content: candidate.content,
                summary: candidate.summary,
                relevance_score: final_score,
            });
        }

        log.push(LogLine::new(
            LogKind::Result,
            format!("final selection: {} relevant articles", results.len()),
        ));

        Ok((results, queries, total_found))
    }

    /// Completed searches for this session, oldest first.
    pub fn history(&self) -> &[QueryLogEntry] {
        &self.history
    }

    /// Clear the session history.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

/// Relevance of an article to a question, in [0, 1].
///
/// Each question keyword contributes [`TITLE_MATCH_WEIGHT`] when it
/// relates to any title keyword and, independently,
/// [`CONTENT_MATCH_WEIGHT`] when it relates to any keyword of the first
/// 500 characters of content. "Relates" is bidirectional substring
/// containment, so "learn" matches "learning" and vice versa.
pub fn relevance_score(question: &str, title: &str, content: &str) -> f64 {
    let question_keywords = planner::extract_keywords(question);
    let title_keywords = planner::extract_keywords(title);
    let content_keywords = planner::extract_keywords(&make_summary(content));

    let mut score = 0.0;
    for keyword in &question_keywords {
        if title_keywords.iter().any(|w| relates(keyword, w)) {
            score += TITLE_MATCH_WEIGHT;
        }
        if content_keywords.iter().any(|w| relates(keyword, w)) {
            score += CONTENT_MATCH_WEIGHT;
        }
    }

    score.min(1.0)
}

fn relates(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}
