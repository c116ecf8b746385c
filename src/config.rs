use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Number of parsed records written per insert transaction.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

fn default_batch_size() -> usize {
    500
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Results returned per question.
    #[serde(default = "default_final_limit")]
    pub final_limit: i64,
    /// Full-text hits fetched per generated query before fusion.
    #[serde(default = "default_per_query_limit")]
    pub per_query_limit: i64,
    /// Character budget for the context block built by `wdx ask`.
    #[serde(default = "default_context_chars")]
    pub context_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            final_limit: default_final_limit(),
            per_query_limit: default_per_query_limit(),
            context_chars: default_context_chars(),
        }
    }
}

fn default_final_limit() -> i64 {
    5
}
fn default_per_query_limit() -> i64 {
    10
}
fn default_context_chars() -> usize {
    2000
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorConfig {
    /// `disabled` or `openai-compatible`.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            api_base: None,
            timeout_secs: 60,
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

impl GeneratorConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate ingest
    if config.ingest.batch_size == 0 {
        anyhow::bail!("ingest.batch_size must be > 0");
    }

    // Validate retrieval
    if config.retrieval.final_limit < 1 {
        anyhow::bail!("retrieval.final_limit must be >= 1");
    }
    if config.retrieval.per_query_limit < 1 {
        anyhow::bail!("retrieval.per_query_limit must be >= 1");
    }

    // Validate generator
    if config.generator.is_enabled() {
        if config.generator.model.is_none() {
            anyhow::bail!(
                "generator.model must be specified when provider is '{}'",
                config.generator.provider
            );
        }
        if config.generator.api_base.is_none() {
            anyhow::bail!(
                "generator.api_base must be specified when provider is '{}'",
                config.generator.provider
            );
        }
    }

    match config.generator.provider.as_str() {
        "disabled" | "openai-compatible" => {}
        other => anyhow::bail!(
            "Unknown generator provider: '{}'. Must be disabled or openai-compatible.",
            other
        ),
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("wdx.toml");
        std::fs::write(&path, contents).unwrap();
        (tmp, path)
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let (_tmp, path) = write_config("[db]\npath = \"./wdx.sqlite\"\n");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.ingest.batch_size, 500);
        assert_eq!(cfg.retrieval.final_limit, 5);
        assert!(!cfg.generator.is_enabled());
    }

    #[test]
    fn rejects_zero_batch_size() {
        let (_tmp, path) =
            write_config("[db]\npath = \"./wdx.sqlite\"\n\n[ingest]\nbatch_size = 0\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn enabled_generator_requires_model_and_base() {
        let (_tmp, path) = write_config(
            "[db]\npath = \"./wdx.sqlite\"\n\n[generator]\nprovider = \"openai-compatible\"\n",
        );
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn rejects_unknown_provider() {
        let (_tmp, path) = write_config(
            "[db]\npath = \"./wdx.sqlite\"\n\n[generator]\nprovider = \"oracle\"\nmodel = \"m\"\napi_base = \"http://x\"\n",
        );
        assert!(load_config(&path).is_err());
    }
}
