//! Tone analyzer API client
//!
//! Scores review text into tone categories via the tone analyzer REST API:
//! `POST {base_url}/v3/tone?version={api_version}` with body `{"text": ...}`
//! and HTTP basic auth (`apikey` / key). The response carries
//! `document_tone.tones[] {tone_id, score}`; a response without
//! `document_tone` means nothing could be scored.
//!
//! Requests pass through a token-bucket rate limiter. Transient failures
//! (429, 503, network) are retried with backoff within a time budget.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use serde_json::json;
use std::num::NonZeroU32;
use std::time::Duration;

use crate::models::ToneScore;
use crate::types::{ScoreError, ToneScorer};
use crate::utils::retry_with_backoff;

pub const DEFAULT_API_VERSION: &str = "2017-09-21";
const USER_AGENT: &str = concat!("hrs-indexer/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ToneAnalyzerConfig {
    pub api_key: String,
    /// Service instance URL, without the `/v3/tone` suffix
    pub base_url: String,
    pub api_version: String,
    pub requests_per_second: u32,
    pub retry_budget_ms: u64,
    pub timeout: Duration,
}

impl ToneAnalyzerConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            requests_per_second: 5,
            retry_budget_ms: 2000,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToneResponse {
    document_tone: Option<DocumentTone>,
}

#[derive(Debug, Deserialize)]
struct DocumentTone {
    #[serde(default)]
    tones: Vec<ApiTone>,
}

#[derive(Debug, Deserialize)]
struct ApiTone {
    tone_id: String,
    score: f64,
}

impl ToneResponse {
    fn into_scores(self) -> Vec<ToneScore> {
        self.document_tone
            .map(|doc| {
                doc.tones
                    .into_iter()
                    .map(|t| ToneScore::new(t.tone_id, t.score))
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub struct ToneAnalyzerClient {
    http_client: reqwest::Client,
    config: ToneAnalyzerConfig,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl ToneAnalyzerClient {
    pub fn new(config: ToneAnalyzerConfig) -> Result<Self, ScoreError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ScoreError::Transient(e.to_string()))?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(Self {
            http_client,
            config,
            rate_limiter,
        })
    }

    fn tone_url(&self) -> String {
        format!(
            "{}/v3/tone?version={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_version
        )
    }

    async fn request_tones(&self, text: &str) -> Result<Vec<ToneScore>, ScoreError> {
        self.rate_limiter.until_ready().await;

        let response = self
            .http_client
            .post(self.tone_url())
            .basic_auth("apikey", Some(&self.config.api_key))
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| ScoreError::Transient(e.to_string()))?;

        let status = response.status();
        match status.as_u16() {
            401 | 403 => {
                let body = response.text().await.unwrap_or_default();
                return Err(ScoreError::Unauthorized(format!("{}: {}", status, body)));
            }
            429 | 502 | 503 | 504 => {
                return Err(ScoreError::Transient(format!("status {}", status)));
            }
            _ if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(ScoreError::Api(status.as_u16(), body));
            }
            _ => {}
        }

        let parsed: ToneResponse = response
            .json()
            .await
            .map_err(|e| ScoreError::Parse(e.to_string()))?;

        Ok(parsed.into_scores())
    }
}

#[async_trait]
impl ToneScorer for ToneAnalyzerClient {
    fn name(&self) -> &'static str {
        "tone-analyzer"
    }

    async fn score(&self, text: &str) -> Result<Vec<ToneScore>, ScoreError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let tones = retry_with_backoff(
            "tone scoring",
            self.config.retry_budget_ms,
            ScoreError::is_transient,
            || self.request_tones(text),
        )
        .await?;

        tracing::debug!(tones = tones.len(), chars = text.len(), "Scored review text");
        Ok(tones)
    }
}
