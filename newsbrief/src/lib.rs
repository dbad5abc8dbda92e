// Library interface for newsbrief modules
// This allows tests and the CLI binary to import modules

pub mod article;
pub mod cache;
pub mod context;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod lines;
pub mod llm;
pub mod news;
pub mod retry;

pub use article::Article;
pub use context::NewsContext;
pub use error::{ConfigError, NewsError, SummarizeError};
pub use lines::{normalize_to_three_lines, SummaryResult};
pub use llm::summarizer::{SummaryRequest, Summarizer};

/// Read a required API key from the environment. Unset and blank are both missing.
pub fn credential(var: &str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingCredential { var: var.to_string() }),
    }
}
