use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::cache::{fingerprint, Params, ResponseCache};
use crate::error::{NewsError, NewsResult};
use crate::retry::RetryPolicy;

/// Outbound GET with response caching and status-based retries.
///
/// A cache hit short-circuits everything: no request, no retry bookkeeping.
/// Only a 200 response is parsed and stored.
#[derive(Debug, Clone)]
pub struct RetryingFetcher {
    client: Client,
    cache: Arc<ResponseCache>,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    pub fn new(timeout: Duration, cache: Arc<ResponseCache>, policy: RetryPolicy) -> NewsResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("newsbrief/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, cache, policy })
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn fetch(&self, url: &str, params: &Params) -> NewsResult<Value> {
        let key = fingerprint(url, params);
        if let Some(cached) = self.cache.get(&key) {
            debug!(key = &key[..12], "cache hit");
            return Ok(cached);
        }

        let policy = &self.policy;
        let body = policy
            .run(
                |_| self.get_once(url, params),
                |err| err.status().is_some_and(|s| policy.is_retryable_status(s)),
            )
            .await?;

        self.cache.set(key.clone(), body.clone());
        info!(key = &key[..12], "news response cached");
        Ok(body)
    }

    // `?` on reqwest errors goes through `From`, which drops the URL (and the API key in it)
    async fn get_once(&self, url: &str, params: &Params) -> NewsResult<Value> {
        let response = self.client.get(url).query(params).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::OK {
            return serde_json::from_str(&text).map_err(|e| NewsError::Decode(e.to_string()));
        }

        let detail = match serde_json::from_str::<Value>(&text) {
            Ok(json) => json.to_string(),
            Err(_) => text,
        };
        Err(NewsError::Upstream {
            status: status.as_u16(),
            detail,
        })
    }
}
