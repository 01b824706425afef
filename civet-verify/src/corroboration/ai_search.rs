//! AI Search Corroboration Client (Layer 2)
//!
//! **[CVT-COR-030]** Corroborates claims against a search-grounded answer
//! API. The transport is injectable (`AnswerTransport`) so tests run with
//! canned payloads; the shipped transport is a rate-limited reqwest client
//! with bearer-token auth.
//!
//! Upstream payloads are untyped JSON and are only read through the
//! explicit extraction functions below: a shape mismatch becomes
//! `CorroborationError::Parse`, never a panic.

use super::classifier::{self, EvidenceSignals};
use super::RateLimiter;
use crate::error::CorroborationError;
use crate::types::{Claim, CorroborationSource, Layer, LayerVerdict};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const ANSWER_API_URL: &str = "https://api.perplexity.ai/chat/completions";
const ANSWER_MODEL: &str = "sonar";
const SOURCE_ID: &str = "ai-search";
/// Citation URLs carried into `sources_checked` beyond this are dropped
const MAX_CITED_SOURCES: usize = 5;

/// Transport returning the raw JSON answer payload for a question
#[async_trait::async_trait]
pub trait AnswerTransport: Send + Sync {
    async fn fetch_answer(
        &self,
        question: &str,
        timeout: Duration,
    ) -> Result<Value, CorroborationError>;
}

/// Shipped HTTP transport: rate-limited, bearer-authenticated
pub struct HttpAnswerTransport {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    rate_limiter: RateLimiter,
}

impl HttpAnswerTransport {
    pub fn new(api_key: String) -> Result<Self, CorroborationError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| CorroborationError::Network(e.to_string()))?;
        Ok(Self {
            http,
            api_key,
            endpoint: ANSWER_API_URL.to_string(),
            rate_limiter: RateLimiter::new(super::RATE_LIMIT_MS),
        })
    }
}

#[async_trait::async_trait]
impl AnswerTransport for HttpAnswerTransport {
    async fn fetch_answer(
        &self,
        question: &str,
        timeout: Duration,
    ) -> Result<Value, CorroborationError> {
        self.rate_limiter.wait().await;

        let body = json!({
            "model": ANSWER_MODEL,
            "messages": [
                {"role": "user", "content": question}
            ],
        });

        debug!(endpoint = %self.endpoint, "Querying answer API");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CorroborationError::Timeout
                } else {
                    CorroborationError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(CorroborationError::MissingCredentials);
        }
        if status.as_u16() == 429 {
            return Err(CorroborationError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CorroborationError::Api(status.as_u16(), text));
        }

        response
            .json()
            .await
            .map_err(|e| CorroborationError::Parse(e.to_string()))
    }
}

/// Answer text from the payload, if the expected shape is present
pub fn extract_answer_text(payload: &Value) -> Option<&str> {
    payload
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}

/// Citation URLs from the payload; missing or malformed entries are skipped
pub fn extract_citations(payload: &Value) -> Vec<String> {
    payload
        .get("citations")
        .and_then(Value::as_array)
        .map(|urls| {
            urls.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Publication date of the freshest search result backing the answer
pub fn extract_observed_at(payload: &Value) -> Option<DateTime<Utc>> {
    let results = payload.get("search_results")?.as_array()?;
    results
        .iter()
        .filter_map(|r| r.get("date")?.as_str())
        .filter_map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .max()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// AI-assisted corroboration client
pub struct AiSearchClient {
    transport: Option<Box<dyn AnswerTransport>>,
    prior: u8,
}

impl AiSearchClient {
    /// Build from configuration; without a resolvable API key the client
    /// reports itself disabled and the layer is skipped
    pub fn from_config(config: &civet_common::VerifyConfig) -> Self {
        let transport = crate::config::resolve_ai_api_key(config)
            .and_then(|key| HttpAnswerTransport::new(key).ok())
            .map(|t| Box::new(t) as Box<dyn AnswerTransport>);
        Self {
            transport,
            prior: config.priors.ai_search,
        }
    }

    /// Test/bench constructor with an injected transport
    pub fn with_transport(transport: Box<dyn AnswerTransport>, prior: u8) -> Self {
        Self {
            transport: Some(transport),
            prior,
        }
    }

    /// Phrase the claim as a question the answer API can corroborate
    fn build_question(claim: &Claim) -> String {
        let scope = claim
            .jurisdiction
            .as_deref()
            .map(|s| format!(" in {}", s))
            .unwrap_or_default();
        format!(
            "Is the following claim correct? The {} for an upcoming election{} is {}. \
             Confirm or contradict, citing official election sources.",
            claim.field, scope, claim.value
        )
    }
}

#[async_trait::async_trait]
impl CorroborationSource for AiSearchClient {
    fn layer(&self) -> Layer {
        Layer::AiCorroboration
    }

    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    async fn corroborate(
        &self,
        claim: &Claim,
        timeout: Duration,
    ) -> Result<LayerVerdict, CorroborationError> {
        let transport = self
            .transport
            .as_ref()
            .ok_or(CorroborationError::MissingCredentials)?;

        let question = Self::build_question(claim);
        let payload = transport.fetch_answer(&question, timeout).await?;

        let answer = extract_answer_text(&payload).ok_or_else(|| {
            CorroborationError::Parse("payload carries no answer text".to_string())
        })?;
        let citations = extract_citations(&payload);
        let observed_at = extract_observed_at(&payload);

        let signals = EvidenceSignals {
            assessment: classifier::classify(answer),
            value_agreement: None,
            has_citation: classifier::has_citation_markers(answer, &citations),
            observed_at,
        };

        let mut verdict =
            classifier::score_evidence(self.layer(), SOURCE_ID, self.prior, &signals, Utc::now());
        verdict
            .sources_checked
            .extend(citations.into_iter().take(MAX_CITED_SOURCES));

        debug!(
            is_valid = verdict.is_valid,
            confidence = verdict.confidence,
            "AI corroboration verdict"
        );
        Ok(verdict)
    }
}
