use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bytes of a page read before the rest is dropped
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Best-effort article body extraction.
///
/// Downloads a page and keeps only the text of its `<p>` elements. Every
/// failure is swallowed: callers get an empty string instead of an error.
#[derive(Debug, Clone)]
pub struct BodyExtractor {
    client: Client,
    max_chars: usize,
}

impl BodyExtractor {
    pub fn new(timeout: Duration, user_agent: &str, max_chars: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self { client, max_chars })
    }

    pub fn from_config(config: &common::ExtractionConfig) -> Result<Self> {
        Self::new(config.timeout(), config.user_agent(), config.max_chars())
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Paragraph text of `url`, truncated to `max_chars` characters; empty on any failure.
    pub async fn extract(&self, url: &str) -> String {
        match self.try_extract(url).await {
            Ok(text) => {
                info!(url, chars = text.chars().count(), "extracted article body");
                text
            }
            Err(e) => {
                warn!(url, "article body extraction failed: {:#}", e);
                String::new()
            }
        }
    }

    async fn try_extract(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url).context("failed to parse article URL")?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("unsupported URL scheme: {}", parsed.scheme());
        }

        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .context("failed to fetch article page")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("article fetch failed with status: {}", status);
        }

        if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default();
            if !content_type.contains("html") {
                anyhow::bail!("not an HTML page: {}", content_type);
            }
        }

        let html = read_capped(&mut response, MAX_BODY_BYTES).await?;
        let max_chars = self.max_chars;

        // html5ever parsing is CPU-bound and the DOM is !Send; keep it off the async workers
        tokio::task::spawn_blocking(move || paragraph_text(&html, max_chars))
            .await
            .context("paragraph extraction task failed")
    }
}

/// Body decoded as UTF-8 (lossy), stopping after `limit` bytes. A cut page
/// still parses; its trailing paragraphs are simply missing.
async fn read_capped(response: &mut reqwest::Response, limit: usize) -> Result<String> {
    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await.context("failed to read response body")? {
        let room = limit.saturating_sub(body.len());
        body.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if body.len() >= limit {
            debug!(limit, "page body truncated");
            break;
        }
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Text of every `<p>` in document order, joined by single spaces, trimmed
/// and cut to at most `max_chars` characters.
pub fn paragraph_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };

    let paragraphs: Vec<String> = document
        .select(&selector)
        .map(|p| p.text().collect::<String>())
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
        .collect();

    debug!(paragraphs = paragraphs.len(), "collected paragraph text");

    let joined = paragraphs.join(" ");
    joined.trim().chars().take(max_chars).collect()
}
