//! Text generation backend abstraction.
//!
//! The search engine itself never depends on a generator; `wdx ask`
//! composes reviewed search results into a context block and hands the
//! prompt to whichever backend is configured. Two providers exist:
//!
//! - **disabled** — returns an error; `wdx ask` falls back to printing
//!   the composed context.
//! - **openai-compatible** — POSTs to a `/chat/completions` endpoint
//!   (llama.cpp, Ollama, vLLM, and the hosted APIs all speak this shape).
//!
//! The provider is selected once at construction from the config; nothing
//! re-dispatches on runtime type.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::GeneratorConfig;

/// Capability interface for answering a prompt with generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the model identifier, or `"disabled"`.
    fn model_name(&self) -> &str;

    /// Generate a completion for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Provider used when no generator is configured.
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        bail!("No generator configured. Set [generator] provider in config.")
    }
}

/// Chat-completions client for OpenAI-compatible servers.
pub struct OpenAiCompatGenerator {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatGenerator {
    pub fn new(api_base: String, model: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(OpenAiCompatGenerator {
            client,
            api_base,
            model,
            api_key: std::env::var("WDX_API_KEY").ok(),
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
        });

        let mut request = self.client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.context("generator request failed")?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("generator returned HTTP {}: {}", status, detail);
        }

        let value: serde_json::Value = response
            .json()
            .await
            .context("generator returned invalid JSON")?;
        let content = value["choices"][0]["message"]["content"]
            .as_str()
            .context("generator response missing choices[0].message.content")?;

        Ok(content.to_string())
    }
}

/// Instantiate the configured provider.
pub fn create_generator(config: &GeneratorConfig) -> Result<Box<dyn TextGenerator>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledGenerator)),
        "openai-compatible" => {
            let api_base = config
                .api_base
                .clone()
                .context("generator.api_base is required")?;
            let model = config.model.clone().context("generator.model is required")?;
            Ok(Box::new(OpenAiCompatGenerator::new(
                api_base,
                model,
                config.timeout_secs,
            )?))
        }
        other => bail!("Unknown generator provider: '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_generator_errors() {
        let generator = DisabledGenerator;
        assert_eq!(generator.model_name(), "disabled");
        assert!(generator.generate("hello").await.is_err());
    }

    #[test]
    fn create_dispatches_on_provider() {
        let disabled = create_generator(&GeneratorConfig::default()).unwrap();
        assert_eq!(disabled.model_name(), "disabled");

        let cfg = GeneratorConfig {
            provider: "openai-compatible".to_string(),
            model: Some("llama-3".to_string()),
            api_base: Some("http://localhost:8080/v1".to_string()),
            timeout_secs: 10,
        };
        let generator = create_generator(&cfg).unwrap();
        assert_eq!(generator.model_name(), "llama-3");

        let bad = GeneratorConfig {
            provider: "oracle".to_string(),
            ..GeneratorConfig::default()
        };
        assert!(create_generator(&bad).is_err());
    }
}
