use anyhow::{Context as _, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::article::Article;
use crate::cache::ResponseCache;
use crate::lines::SummaryResult;
use crate::llm::summarizer::{fallback_summary, SummaryRequest, Summarizer};
use crate::news::NewsClient;

/// Everything a request needs, built once at startup and shared by handle.
///
/// Holds the news client (and through it the process-wide response cache) and
/// the summarizer. Both are read-only after construction.
#[derive(Clone)]
pub struct NewsContext {
    pub news: Arc<NewsClient>,
    pub summarizer: Arc<Summarizer>,
    pub cache: Arc<ResponseCache>,
}

impl NewsContext {
    pub fn new(news: NewsClient, summarizer: Summarizer, cache: Arc<ResponseCache>) -> Self {
        Self {
            news: Arc::new(news),
            summarizer: Arc::new(summarizer),
            cache,
        }
    }

    /// Build both clients from configuration. A missing API key for either
    /// provider is a fatal error here.
    pub fn from_config(config: &common::Config) -> Result<Self> {
        let cache = Arc::new(ResponseCache::new(config.news.cache_ttl()));
        let news = NewsClient::from_config(&config.news, cache.clone())
            .context("failed to initialize news client")?;
        let summarizer = Summarizer::from_config(config)?;

        Ok(Self::new(news, summarizer, cache))
    }

    /// Summarize every article with at most `concurrency` summaries in flight.
    /// Results keep the input order.
    ///
    /// When the summarizer has fallback disabled, a failed article gets its
    /// field-based summary here instead, so one bad article never sinks the batch.
    pub async fn digest(&self, articles: Vec<Article>, concurrency: usize) -> Vec<(Article, SummaryResult)> {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, article) in articles.iter().enumerate() {
            let semaphore = semaphore.clone();
            let summarizer = self.summarizer.clone();
            let request = SummaryRequest::from(article);

            tasks.spawn(async move {
                let summary = match semaphore.acquire_owned().await {
                    Ok(_permit) => match summarizer.summarize(&request).await {
                        Ok(summary) => summary,
                        Err(e) => {
                            error!(url = ?request.url, "summary failed: {}", e);
                            fallback_summary(&request)
                        }
                    },
                    Err(_) => fallback_summary(&request),
                };
                (index, summary)
            });
        }

        let mut summaries: Vec<Option<SummaryResult>> = vec![None; articles.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, summary)) => summaries[index] = Some(summary),
                Err(e) => error!(%e, "digest task panicked"),
            }
        }

        info!(count = articles.len(), concurrency, "digest complete");
        articles
            .into_iter()
            .zip(summaries)
            .map(|(article, summary)| {
                let summary = summary.unwrap_or_else(|| fallback_summary(&SummaryRequest::from(&article)));
                (article, summary)
            })
            .collect()
    }
}
