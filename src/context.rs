//! Context extraction for prompts.
//!
//! Builds a bounded text block from reviewed search results, with source
//! attribution and a confidence score, suitable for handing to a text
//! generator as question context.

use crate::models::SearchCandidate;
use crate::planner;

/// A context block assembled from search results.
#[derive(Debug, Clone)]
pub struct QuestionContext {
    pub context_text: String,
    pub sources: Vec<String>,
    pub confidence: f64,
}

/// Build a context block of at most `max_chars` characters from the given
/// results. Each article contributes its summary under a title heading;
/// articles that no longer fit are dropped (the last one is shortened when
/// enough room remains).
pub fn build_context(
    question: &str,
    results: &[SearchCandidate],
    max_chars: usize,
) -> QuestionContext {
    if results.is_empty() {
        return QuestionContext {
            context_text: "No relevant articles found.".to_string(),
            sources: Vec::new(),
            confidence: 0.0,
        };
    }

    let mut parts: Vec<String> = Vec::new();
    let mut used = 0usize;

    for result in results {
        let text = if result.summary.is_empty() {
            &result.content
        } else {
            &result.summary
        };
        let part = format!("**{}**\n{}\n", result.title, text);

        if used + part.len() > max_chars {
            let remaining = max_chars.saturating_sub(used + 50);
            if remaining > 100 {
                let short: String = text.chars().take(remaining).collect();
                parts.push(format!("**{}**\n{}...\n", result.title, short));
            }
            break;
        }

        used += part.len();
        parts.push(part);
    }

    let sources: Vec<String> = results.iter().map(|r| r.title.clone()).collect();
    let mut context_text = parts.join("\n");
    context_text.push_str(&format!("\n*Sources: {}*", sources.join(", ")));

    QuestionContext {
        confidence: confidence_score(question, results),
        context_text,
        sources,
    }
}

/// Confidence in [0, 1]: mean relevance (weight 0.5), article-count factor
/// saturating at three articles (0.3), and question keyword coverage by
/// titles and summaries (0.2).
pub fn confidence_score(question: &str, results: &[SearchCandidate]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }

    let avg_relevance =
        results.iter().map(|r| r.relevance_score).sum::<f64>() / results.len() as f64;
    let article_factor = (results.len() as f64 / 3.0).min(1.0);

    let question_keywords = planner::extract_keywords(question);
    let coverage = if question_keywords.is_empty() {
        0.0
    } else {
        let mut covered = 0usize;
        for keyword in &question_keywords {
            let keyword_covered = results.iter().any(|r| {
                let haystack = format!("{} {}", r.title, r.summary).to_lowercase();
                haystack.contains(keyword.as_str())
            });
            if keyword_covered {
                covered += 1;
            }
        }
        covered as f64 / question_keywords.len() as f64
    };

    (avg_relevance * 0.5 + article_factor * 0.3 + coverage * 0.2).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, summary: &str, score: f64) -> SearchCandidate {
        SearchCandidate {
            title: title.to_string(),
            content: summary.to_string(),
            summary: summary.to_string(),
            relevance_score: score,
            url: String::new(),
        }
    }

    #[test]
    fn empty_results_give_zero_confidence() {
        let ctx = build_context("What is Poland?", &[], 2000);
        assert_eq!(ctx.confidence, 0.0);
        assert!(ctx.sources.is_empty());
    }

    #[test]
    fn context_lists_sources() {
        let results = vec![
            candidate("Poland", "Poland is a country.", 1.0),
            candidate("Warsaw", "Warsaw is the capital.", 0.5),
        ];
        let ctx = build_context("What is Poland?", &results, 2000);
        assert!(ctx.context_text.contains("**Poland**"));
        assert!(ctx.context_text.contains("*Sources: Poland, Warsaw*"));
        assert_eq!(ctx.sources, vec!["Poland", "Warsaw"]);
    }

    #[test]
    fn context_respects_char_budget() {
        let long = "x".repeat(900);
        let results = vec![
            candidate("First", &long, 1.0),
            candidate("Second", &long, 0.9),
            candidate("Third", &long, 0.8),
        ];
        let ctx = build_context("anything", &results, 1000);
        assert!(!ctx.context_text.contains("**Third**"));
    }

    #[test]
    fn confidence_stays_in_unit_interval() {
        let results = vec![
            candidate("Poland", "Poland is a country in Europe.", 1.0),
            candidate("Warsaw", "Warsaw is the capital of Poland.", 1.0),
            candidate("Krakow", "Krakow is a city in Poland.", 1.0),
        ];
        let c = confidence_score("Poland?", &results);
        assert!((0.0..=1.0).contains(&c));
        // Full relevance, three articles, full coverage: the ceiling.
        assert!((c - 1.0).abs() < 1e-9);
    }

    #[test]
    fn confidence_grows_with_article_count() {
        let one = vec![candidate("Poland", "Poland is a country.", 0.5)];
        let three = vec![
            candidate("Poland", "Poland is a country.", 0.5),
            candidate("Warsaw", "Warsaw is in Poland.", 0.5),
            candidate("Krakow", "Krakow is in Poland.", 0.5),
        ];
        assert!(
            confidence_score("What is Poland?", &three)
                > confidence_score("What is Poland?", &one)
        );
    }
}
