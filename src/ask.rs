//! The `wdx ask` command: search, assemble context, and (optionally)
//! generate an answer.
//!
//! Without a configured generator this prints the assembled context block
//! and its confidence, which is still useful for piping into another tool.

use anyhow::Result;

use crate::config::Config;
use crate::context;
use crate::db;
use crate::engine::SearchEngine;
use crate::generator;
use crate::store::ArticleStore;

pub async fn run_ask(config: &Config, question: &str) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = ArticleStore::new(pool.clone());
    let mut engine = SearchEngine::new(store, config.retrieval.per_query_limit);

    let response = engine.search(question, config.retrieval.final_limit).await;
    pool.close().await;

    if let Some(ref err) = response.error {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    let ctx = context::build_context(question, &response.results, config.retrieval.context_chars);

    if !config.generator.is_enabled() {
        println!("{}", ctx.context_text);
        println!();
        println!("(confidence: {:.2}; no generator configured, showing context only)", ctx.confidence);
        return Ok(());
    }

    let generator = generator::create_generator(&config.generator)?;
    let prompt = format!(
        "Answer the question using only the reference articles below. \
         If they do not contain the answer, say so.\n\n\
         Reference articles:\n{}\n\nQuestion: {}\nAnswer:",
        ctx.context_text, question
    );
    let answer = generator.generate(&prompt).await?;

    println!("{}", answer.trim());
    if !ctx.sources.is_empty() {
        println!();
        println!("Sources: {}", ctx.sources.join(", "));
    }
    println!("Confidence: {:.2}", ctx.confidence);

    Ok(())
}
