//! Query planning: keyword extraction and query expansion.
//!
//! A question becomes a deduplicated set of candidate queries — the
//! question itself, each extracted keyword, and each adjacent keyword
//! bigram. The search engine runs every candidate against the full-text
//! index and every keyword against the exact-title lookup.

/// Question words and glue dropped during keyword extraction.
const STOP_WORDS: &[&str] = &[
    "what", "is", "are", "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for",
    "of", "with", "by", "about", "how", "why", "when", "where", "who",
];

/// Extract search keywords from a question: lowercase, replace non-word
/// characters with whitespace, split, then drop stop words and tokens
/// shorter than three characters.
pub fn extract_keywords(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .filter(|token| token.chars().count() > 2 && !STOP_WORDS.contains(token))
        .map(|token| token.to_string())
        .collect()
}

/// Expand a question into candidate queries: the question verbatim, each
/// keyword, and each adjacent keyword bigram (consecutive pairs only, not
/// all combinations). Duplicates are dropped keeping the first occurrence;
/// empty entries are dropped. With zero keywords the set degenerates to
/// exactly the question.
pub fn generate_queries(question: &str) -> Vec<String> {
    let keywords = extract_keywords(question);

    let mut queries: Vec<String> = Vec::with_capacity(1 + keywords.len() * 2);
    queries.push(question.to_string());
    queries.extend(keywords.iter().cloned());
    for pair in keywords.windows(2) {
        queries.push(format!("{} {}", pair[0], pair[1]));
    }

    let mut seen = std::collections::HashSet::new();
    queries
        .into_iter()
        .filter(|q| !q.trim().is_empty())
        .filter(|q| seen.insert(q.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_keywords_dropping_stop_words_and_short_tokens() {
        assert_eq!(
            extract_keywords("What is Machine Learning?"),
            vec!["machine", "learning"]
        );
        // "ai" survives the stop-word list but not the length filter
        assert_eq!(extract_keywords("What is AI?"), Vec::<String>::new());
    }

    #[test]
    fn extraction_is_deterministic() {
        let a = extract_keywords("Why do neural networks need training data?");
        let b = extract_keywords("Why do neural networks need training data?");
        assert_eq!(a, b);
    }

    #[test]
    fn queries_include_question_keywords_and_adjacent_bigrams() {
        let queries = generate_queries("What is the history of artificial intelligence?");
        assert_eq!(
            queries,
            vec![
                "What is the history of artificial intelligence?",
                "history",
                "artificial",
                "intelligence",
                "history artificial",
                "artificial intelligence",
            ]
        );
    }

    #[test]
    fn query_count_is_bounded() {
        // At most 1 + N + max(N-1, 0) entries before deduplication.
        let question = "quantum computing hardware errors correction";
        let n = extract_keywords(question).len();
        let queries = generate_queries(question);
        assert!(queries.len() <= 1 + n + n.saturating_sub(1));
        assert_eq!(queries[0], question);
    }

    #[test]
    fn zero_keywords_degenerates_to_question() {
        assert_eq!(generate_queries("Hi"), vec!["Hi"]);
    }

    #[test]
    fn question_is_kept_verbatim_including_whitespace() {
        let queries = generate_queries("  What is Poland?  ");
        assert_eq!(queries[0], "  What is Poland?  ");
        // Whitespace-only input still yields no usable query.
        assert!(generate_queries("   ").is_empty());
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let queries = generate_queries("poland poland");
        assert_eq!(queries, vec!["poland poland", "poland"]);
    }
}
