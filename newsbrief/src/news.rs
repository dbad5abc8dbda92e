//! News provider client (NewsAPI-style `top-headlines` and `everything` endpoints)

use std::sync::Arc;
use tracing::{info, instrument};

use crate::article::{normalize_all, Article};
use crate::cache::{Params, ResponseCache};
use crate::error::{ConfigError, NewsResult};
use crate::fetcher::RetryingFetcher;
use crate::retry::RetryPolicy;

/// Optional filters for the headlines endpoint
#[derive(Debug, Clone, Default)]
pub struct HeadlinesQuery {
    pub country: Option<String>,
    pub category: Option<String>,
    pub page_size: Option<u32>,
}

/// Parameters for the search endpoint
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub page_size: Option<u32>,
    pub sort_by: Option<String>,
    pub language: Option<String>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page_size: None,
            sort_by: None,
            language: None,
        }
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

pub struct NewsClient {
    base_url: String,
    api_key: String,
    default_language: String,
    default_page_size: u32,
    fetcher: RetryingFetcher,
}

impl NewsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        fetcher: RetryingFetcher,
    ) -> NewsResult<Self> {
        let base_url = base_url.into();
        if url::Url::parse(&base_url).is_err() {
            return Err(ConfigError::InvalidUrl { url: base_url }.into());
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            default_language: "ko".to_string(),
            default_page_size: 8,
            fetcher,
        })
    }

    /// Build a client from the `[news]` config section, reading the API key
    /// from the configured environment variable.
    pub fn from_config(config: &common::NewsConfig, cache: Arc<ResponseCache>) -> NewsResult<Self> {
        let api_key = crate::credential(config.api_key_env())?;
        let policy = RetryPolicy::new(config.max_retries(), config.initial_backoff());
        let fetcher = RetryingFetcher::new(config.timeout(), cache, policy)?;

        Ok(Self::new(config.base_url(), api_key, fetcher)?
            .with_defaults(config.language(), config.page_size()))
    }

    pub fn with_defaults(mut self, language: impl Into<String>, page_size: u32) -> Self {
        self.default_language = language.into();
        self.default_page_size = page_size;
        self
    }

    /// Latest headlines, optionally filtered by country and category
    #[instrument(skip(self), fields(country = ?query.country, category = ?query.category))]
    pub async fn top_headlines(&self, query: &HeadlinesQuery) -> NewsResult<Vec<Article>> {
        let url = format!("{}/top-headlines", self.base_url);
        let mut params = self.base_params(query.page_size);
        if let Some(country) = &query.country {
            params.insert("country".into(), country.clone());
        }
        if let Some(category) = &query.category {
            params.insert("category".into(), category.clone());
        }

        let body = self.fetcher.fetch(&url, &params).await?;
        let articles = normalize_all(&body);
        info!(count = articles.len(), "fetched top headlines");
        Ok(articles)
    }

    /// Full-text search over the `everything` endpoint
    #[instrument(skip(self), fields(q = %query.query))]
    pub async fn search(&self, query: &SearchQuery) -> NewsResult<Vec<Article>> {
        let url = format!("{}/everything", self.base_url);
        let mut params = self.base_params(query.page_size);
        params.insert("q".into(), query.query.clone());
        params.insert(
            "sortBy".into(),
            query.sort_by.clone().unwrap_or_else(|| "publishedAt".to_string()),
        );
        params.insert(
            "language".into(),
            query
                .language
                .clone()
                .unwrap_or_else(|| self.default_language.clone()),
        );

        let body = self.fetcher.fetch(&url, &params).await?;
        let articles = normalize_all(&body);
        info!(count = articles.len(), "search returned articles");
        Ok(articles)
    }

    fn base_params(&self, page_size: Option<u32>) -> Params {
        let mut params = Params::new();
        params.insert("apiKey".into(), self.api_key.clone());
        params.insert(
            "pageSize".into(),
            page_size.unwrap_or(self.default_page_size).to_string(),
        );
        params
    }
}

impl std::fmt::Debug for NewsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsClient")
            .field("base_url", &self.base_url)
            .field("default_language", &self.default_language)
            .field("default_page_size", &self.default_page_size)
            .finish_non_exhaustive()
    }
}
