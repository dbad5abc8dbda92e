//! Error types for the newsbrief core

use thiserror::Error;

/// Problems found while building a client from configuration.
/// These are fatal at construction time and never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required API key is not present in the environment
    #[error("missing credential: environment variable {var} is not set")]
    MissingCredential { var: String },

    /// A configured endpoint is not a valid absolute URL
    #[error("invalid URL in configuration: {url}")]
    InvalidUrl { url: String },
}

/// Errors surfaced by the news provider client and the retrying fetcher
#[derive(Debug, Error)]
pub enum NewsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Non-200 status, either non-retryable or with retries exhausted.
    /// `detail` is the JSON body when it parses, the raw text otherwise.
    #[error("news provider error {status}: {detail}")]
    Upstream { status: u16, detail: String },

    /// Transport-level failure (connect, timeout, TLS). Built through
    /// `From`, which strips the request URL and with it the `apiKey` query.
    #[error("news request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// 200 response whose body is not JSON
    #[error("failed to decode news response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for NewsError {
    fn from(err: reqwest::Error) -> Self {
        NewsError::Request(err.without_url())
    }
}

impl NewsError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            NewsError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure of the LLM provider call, only surfaced when fallback is disabled
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("summarization failed: {0:#}")]
    Provider(anyhow::Error),
}

pub type NewsResult<T> = std::result::Result<T, NewsError>;
