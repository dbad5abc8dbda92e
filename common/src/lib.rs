/*!
common/src/lib.rs

Shared configuration types for newsbrief.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader for a TOML config file, with default + override layering
- Resolved defaults for every optional setting
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_NEWS_BASE_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_NEWS_API_KEY_ENV: &str = "NEWSAPI_KEY";
pub const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_LLM_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// News provider section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Root of the provider API (e.g. "https://newsapi.org/v2")
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Default language for search requests
    pub language: Option<String>,
    pub page_size: Option<u32>,
    pub timeout_seconds: Option<u64>,
    pub max_retries: Option<u32>,
    pub initial_backoff_ms: Option<u64>,
    pub cache_ttl_seconds: Option<u64>,
}

impl NewsConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_NEWS_BASE_URL)
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_NEWS_API_KEY_ENV)
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or("ko")
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(8)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(12))
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(2)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms.unwrap_or(1000))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds.unwrap_or(60))
    }
}

/// Remote LLM config (OpenAI-compatible chat completions endpoint)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
    pub max_tokens: Option<usize>,
    /// Degrade to a summary built from raw fields when the provider fails
    pub fallback: Option<bool>,
}

impl LlmConfig {
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_LLM_API_URL)
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_LLM_API_KEY_ENV)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_LLM_MODEL)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(0.2)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(30))
    }

    pub fn fallback(&self) -> bool {
        self.fallback.unwrap_or(true)
    }
}

/// Article body extraction settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub enabled: Option<bool>,
    pub timeout_seconds: Option<u64>,
    pub max_chars: Option<usize>,
    pub user_agent: Option<String>,
}

impl ExtractionConfig {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(8))
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars.unwrap_or(4000)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// Batch summarization settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Maximum number of articles summarized at the same time
    pub concurrency: Option<usize>,
}

impl DigestConfig {
    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(4).max(1)
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub digest: DigestConfig,
}

impl Config {
    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    /// Paths that do not exist are skipped; with neither file present every setting
    /// falls back to its built-in default.
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for path in [default_path, override_path].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: Config = toml::from_str("").expect("parse config");
        assert_eq!(cfg.news.base_url(), DEFAULT_NEWS_BASE_URL);
        assert_eq!(cfg.news.api_key_env(), "NEWSAPI_KEY");
        assert_eq!(cfg.news.timeout(), Duration::from_secs(12));
        assert_eq!(cfg.news.max_retries(), 2);
        assert_eq!(cfg.news.cache_ttl(), Duration::from_secs(60));
        assert_eq!(cfg.llm.model(), "gpt-4o-mini");
        assert!((cfg.llm.temperature() - 0.2).abs() < f32::EPSILON);
        assert!(cfg.llm.fallback());
        assert_eq!(cfg.extraction.max_chars(), 4000);
        assert_eq!(cfg.extraction.timeout(), Duration::from_secs(8));
        assert_eq!(cfg.digest.concurrency(), 4);
    }

    #[test]
    fn partial_sections_parse() {
        let toml = r#"
            [news]
            language = "en"
            page_size = 3

            [llm]
            fallback = false
        "#;

        let cfg: Config = toml::from_str(toml).expect("parse config");
        assert_eq!(cfg.news.language(), "en");
        assert_eq!(cfg.news.page_size(), 3);
        assert!(!cfg.llm.fallback());
        assert_eq!(cfg.llm.api_key_env(), "OPENAI_API_KEY");
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        let cfg = DigestConfig { concurrency: Some(0) };
        assert_eq!(cfg.concurrency(), 1);
    }

    #[tokio::test]
    async fn override_file_wins_per_key() {
        let mut defaults = tempfile::NamedTempFile::new().expect("tmp");
        writeln!(
            defaults,
            "[news]\nlanguage = \"ko\"\npage_size = 8\n\n[llm]\nmodel = \"gpt-4o-mini\""
        )
        .expect("write defaults");

        let mut overrides = tempfile::NamedTempFile::new().expect("tmp");
        writeln!(overrides, "[news]\npage_size = 20").expect("write overrides");

        let cfg = Config::load_with_defaults(Some(defaults.path()), Some(overrides.path()))
            .await
            .expect("load");

        assert_eq!(cfg.news.page_size(), 20);
        assert_eq!(cfg.news.language(), "ko");
        assert_eq!(cfg.llm.model(), "gpt-4o-mini");
    }

    #[tokio::test]
    async fn missing_files_are_skipped() {
        let cfg = Config::load_with_defaults(
            Some(Path::new("/nonexistent/config.default.toml")),
            None,
        )
        .await
        .expect("load");
        assert_eq!(cfg.news.page_size(), 8);
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let mut bad = tempfile::NamedTempFile::new().expect("tmp");
        writeln!(bad, "[news\npage_size = ").expect("write");

        let result = Config::load_with_defaults(None, Some(bad.path())).await;
        assert!(result.is_err());
    }
}
