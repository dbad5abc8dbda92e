// Summarizer module
use anyhow::Context as _;
use std::sync::Arc;
use tracing::{info, warn};

use super::prompt::build_prompt;
use super::remote::RemoteLlmProvider;
use super::{LlmProvider, LlmRequest};
use crate::error::SummarizeError;
use crate::extract::BodyExtractor;
use crate::lines::{normalize_to_three_lines, SummaryResult};

/// Filler used by the fallback summary when raw fields run out
pub const INSUFFICIENT_INFO: &str = "Insufficient information";

/// Maximum characters of title/description kept in a fallback line
const FALLBACK_FIELD_CHARS: usize = 140;

/// Input for a single summary
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl SummaryRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            url: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl From<&crate::article::Article> for SummaryRequest {
    fn from(article: &crate::article::Article) -> Self {
        Self {
            title: article.title.clone(),
            description: article.description.clone(),
            url: Some(article.url.clone()).filter(|u| !u.is_empty()),
        }
    }
}

/// Three-line summarizer over an [`LlmProvider`], with an optional body
/// extractor for extra context and a field-based fallback.
pub struct Summarizer {
    provider: Arc<dyn LlmProvider>,
    extractor: Option<BodyExtractor>,
    temperature: f32,
    fallback: bool,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            extractor: None,
            temperature: 0.2,
            fallback: true,
        }
    }

    /// Remote provider plus optional body extractor, from the `[llm]` and
    /// `[extraction]` sections. Only the LLM credential is required.
    pub fn from_config(config: &common::Config) -> anyhow::Result<Self> {
        let provider = RemoteLlmProvider::from_config(&config.llm)
            .context("failed to initialize LLM provider")?;
        info!(model = provider.model(), "LLM provider initialized");

        let mut summarizer = Self::new(Arc::new(provider))
            .with_temperature(config.llm.temperature())
            .with_fallback(config.llm.fallback());
        if config.extraction.enabled() {
            summarizer = summarizer.with_extractor(BodyExtractor::from_config(&config.extraction)?);
        }
        Ok(summarizer)
    }

    pub fn with_extractor(mut self, extractor: BodyExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback
    }

    /// Summarize into exactly three lines.
    ///
    /// Only fails when the provider call fails and fallback is disabled.
    pub async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResult, SummarizeError> {
        let body = match (&self.extractor, request.url.as_deref()) {
            (Some(extractor), Some(url)) => extractor.extract(url).await,
            _ => String::new(),
        };

        let prompt = build_prompt(
            &request.title,
            request.description.as_deref(),
            request.url.as_deref(),
            Some(body.as_str()),
        );

        let llm_request = LlmRequest {
            temperature: Some(self.temperature),
            ..LlmRequest::new(prompt)
        };

        match self.provider.generate(llm_request).await {
            Ok(response) => {
                info!(
                    model = %response.model,
                    total_tokens = response.usage.total_tokens,
                    "LLM summarization successful"
                );
                Ok(normalize_to_three_lines(response.content.trim()))
            }
            Err(e) if self.fallback => {
                warn!("LLM summarization failed: {:#}, falling back to field summary", e);
                Ok(fallback_summary(request))
            }
            Err(e) => Err(SummarizeError::Provider(e)),
        }
    }
}

/// Summary built from the raw fields: title, description, link, then filler.
pub fn fallback_summary(request: &SummaryRequest) -> SummaryResult {
    let title = request.title.trim();
    let description = request.description.as_deref().map(str::trim).unwrap_or("");
    let url = request.url.as_deref().map(str::trim).unwrap_or("");

    let mut lines: Vec<String> = Vec::with_capacity(3);
    if !title.is_empty() {
        lines.push(truncate_chars(title, FALLBACK_FIELD_CHARS));
    }
    if !description.is_empty() {
        lines.push(truncate_chars(description, FALLBACK_FIELD_CHARS));
    }
    if !url.is_empty() {
        lines.push(format!("See full article: {}", url));
    }

    SummaryResult::padded(lines, INSUFFICIENT_INFO)
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect::<String>().trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmResponse, UsageMetadata};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FailingProvider;

    #[async_trait::async_trait]
    impl LlmProvider for FailingProvider {
        async fn generate(&self, _request: LlmRequest) -> anyhow::Result<LlmResponse> {
            anyhow::bail!("LLM API error 401 Unauthorized: invalid api key")
        }
    }

    struct CannedProvider {
        reply: String,
        calls: AtomicUsize,
        last_request: Mutex<Option<LlmRequest>>,
    }

    impl CannedProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for CannedProvider {
        async fn generate(&self, request: LlmRequest) -> anyhow::Result<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request);
            Ok(LlmResponse {
                content: self.reply.clone(),
                usage: UsageMetadata::default(),
                model: "canned".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn fallback_without_url_pads_with_placeholder() {
        let summarizer = Summarizer::new(Arc::new(FailingProvider));
        let request = SummaryRequest::new("삼성, 차세대 HBM 개발 발표").description("HBM4 양산 계획을 공개");

        let result = summarizer.summarize(&request).await.expect("fallback never fails");
        let lines = result.lines();

        assert!(lines[0].contains("삼성, 차세대 HBM 개발 발표"));
        assert_eq!(lines[1], "HBM4 양산 계획을 공개");
        assert_eq!(lines[2], INSUFFICIENT_INFO);
        assert!(!lines.iter().any(|l| l.contains("See full article")));
    }

    #[tokio::test]
    async fn fallback_disabled_propagates_error() {
        let summarizer = Summarizer::new(Arc::new(FailingProvider)).with_fallback(false);
        let err = summarizer
            .summarize(&SummaryRequest::new("title"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn model_output_is_postprocessed() {
        let provider = Arc::new(CannedProvider::new(
            "\n- Samsung unveiled HBM4.\n- Mass production in 2025.\n- Shares rose 3%.\n- Extra.\n",
        ));
        let summarizer = Summarizer::new(provider.clone()).with_temperature(0.2);

        let result = summarizer
            .summarize(&SummaryRequest::new("Samsung HBM4"))
            .await
            .expect("summary");

        assert_eq!(
            result.lines(),
            &[
                "Samsung unveiled HBM4.".to_string(),
                "Mass production in 2025.".to_string(),
                "Shares rose 3%.".to_string()
            ]
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let sent = provider.last_request.lock().unwrap().clone().expect("request sent");
        assert_eq!(sent.temperature, Some(0.2));
        assert!(sent.prompt.contains("Title: Samsung HBM4"));
    }

    #[test]
    fn fallback_truncates_to_140_chars() {
        let long = "가".repeat(300);
        let result = fallback_summary(
            &SummaryRequest::new(long.clone())
                .description(long)
                .url("https://example.com/a"),
        );
        let lines = result.lines();

        assert_eq!(lines[0].chars().count(), 140);
        assert_eq!(lines[1].chars().count(), 140);
        assert_eq!(lines[2], "See full article: https://example.com/a");
    }

    #[test]
    fn fallback_with_nothing_is_all_placeholders() {
        let result = fallback_summary(&SummaryRequest::new("   "));
        assert!(result.lines().iter().all(|l| l == INSUFFICIENT_INFO));
    }

    #[test]
    fn fallback_skips_missing_description() {
        let result = fallback_summary(&SummaryRequest::new("Title").url("https://x.test"));
        assert_eq!(
            result.lines(),
            &[
                "Title".to_string(),
                "See full article: https://x.test".to_string(),
                INSUFFICIENT_INFO.to_string()
            ]
        );
    }
}
