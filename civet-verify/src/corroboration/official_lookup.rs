//! Official Source Corroboration Client (Layer 3)
//!
//! **[CVT-COR-040]** Corroborates claims against official election sites.
//! Only domains on the configured allowlist are ever fetched; the claim's
//! jurisdiction selects the domains, falling back to the federal (`US`)
//! entry for claims without one. Pages are reduced to text and classified
//! with the shared phrase heuristics.
//!
//! The fetched page is itself the official record, so verdicts from this
//! layer always count as cited.

use super::classifier::{self, EvidenceSignals};
use super::RateLimiter;
use crate::error::CorroborationError;
use crate::types::{Claim, ClaimValue, CorroborationSource, Layer, LayerVerdict};
use chrono::{Datelike, Utc};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

const SOURCE_ID: &str = "official-sites";

/// Transport fetching one page body
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str, timeout: Duration)
        -> Result<String, CorroborationError>;
}

/// Shipped HTTP transport: rate-limited plain GET
pub struct HttpPageFetcher {
    http: reqwest::Client,
    rate_limiter: RateLimiter,
}

impl HttpPageFetcher {
    pub fn new() -> Result<Self, CorroborationError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| CorroborationError::Network(e.to_string()))?;
        Ok(Self {
            http,
            rate_limiter: RateLimiter::new(super::RATE_LIMIT_MS),
        })
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<String, CorroborationError> {
        self.rate_limiter.wait().await;

        debug!(url, "Fetching official source page");
        let response = self
            .http
            .get(url)
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
        if status.as_u16() == 429 {
            return Err(CorroborationError::RateLimited);
        }
        if !status.is_success() {
            return Err(CorroborationError::Api(status.as_u16(), url.to_string()));
        }

        response
            .text()
            .await
            .map_err(|e| CorroborationError::Network(e.to_string()))
    }
}

/// Strip tags (including script/style bodies) and collapse whitespace
pub fn html_to_text(html: &str) -> String {
    let without_scripts = remove_blocks(html, "script");
    let without_styles = remove_blocks(&without_scripts, "style");

    let mut text = String::with_capacity(without_styles.len() / 2);
    let mut in_tag = false;
    for c in without_styles.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove `<tag ...>...</tag>` blocks, case-insensitively
fn remove_blocks(html: &str, tag: &str) -> String {
    // ASCII-lowercased shadow preserves byte offsets into the original
    let shadow: String = html.chars().map(|c| c.to_ascii_lowercase()).collect();
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);

    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(start) = shadow[pos..].find(&open) {
        let start = pos + start;
        out.push_str(&html[pos..start]);
        match shadow[start..].find(&close) {
            Some(end) => pos = start + end + close.len(),
            None => return out, // unterminated block: drop the rest
        }
    }
    out.push_str(&html[pos..]);
    out
}

/// Render the claimed value the way an official page would print it
fn value_mentions(claim: &Claim, page_text: &str) -> Option<bool> {
    match &claim.value {
        ClaimValue::Date(date) => {
            let iso = date.to_string();
            let long = format!(
                "{} {}, {}",
                month_name(date.month()),
                date.day(),
                date.year()
            );
            if page_text.contains(&iso) || page_text.contains(&long) {
                Some(true)
            } else {
                None
            }
        }
        ClaimValue::Text(text) => {
            if page_text.to_lowercase().contains(&text.to_lowercase()) {
                Some(true)
            } else {
                None
            }
        }
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

/// Official election-site corroboration client
pub struct OfficialSourceClient {
    fetcher: Box<dyn PageFetcher>,
    allowlist: BTreeMap<String, Vec<String>>,
    prior: u8,
}

impl OfficialSourceClient {
    pub fn from_config(
        config: &civet_common::VerifyConfig,
    ) -> Result<Self, CorroborationError> {
        Ok(Self {
            fetcher: Box::new(HttpPageFetcher::new()?),
            allowlist: config.official_domains.clone(),
            prior: config.priors.official_site,
        })
    }

    /// Test constructor with an injected fetcher
    pub fn with_fetcher(
        fetcher: Box<dyn PageFetcher>,
        allowlist: BTreeMap<String, Vec<String>>,
        prior: u8,
    ) -> Self {
        Self {
            fetcher,
            allowlist,
            prior,
        }
    }

    /// Allowlisted domains for the claim's jurisdiction, falling back to
    /// the federal entry
    fn domains_for(&self, claim: &Claim) -> Option<&[String]> {
        claim
            .jurisdiction
            .as_deref()
            .and_then(|code| self.allowlist.get(code))
            .or_else(|| self.allowlist.get("US"))
            .map(|v| v.as_slice())
    }
}

#[async_trait::async_trait]
impl CorroborationSource for OfficialSourceClient {
    fn layer(&self) -> Layer {
        Layer::OfficialSources
    }

    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    fn is_enabled(&self) -> bool {
        !self.allowlist.is_empty()
    }

    async fn corroborate(
        &self,
        claim: &Claim,
        timeout: Duration,
    ) -> Result<LayerVerdict, CorroborationError> {
        let domains = self.domains_for(claim).ok_or_else(|| {
            CorroborationError::NotConfigured(format!(
                "no allowlisted official source for jurisdiction {}",
                claim.jurisdiction.as_deref().unwrap_or("(none)")
            ))
        })?;

        let mut last_error = CorroborationError::NotConfigured(
            "official-domain allowlist is empty".to_string(),
        );

        for domain in domains {
            let url = format!("https://{}/", domain);
            match self.fetcher.fetch_page(&url, timeout).await {
                Ok(html) => {
                    let text = html_to_text(&html);
                    let signals = EvidenceSignals {
                        assessment: classifier::classify(&text),
                        value_agreement: value_mentions(claim, &text),
                        // The page is the official record; it cites itself
                        has_citation: true,
                        observed_at: None,
                    };
                    let mut verdict = classifier::score_evidence(
                        self.layer(),
                        SOURCE_ID,
                        self.prior,
                        &signals,
                        Utc::now(),
                    );
                    verdict.sources_checked = vec![domain.clone()];
                    debug!(
                        domain = %domain,
                        is_valid = verdict.is_valid,
                        confidence = verdict.confidence,
                        "Official source verdict"
                    );
                    return Ok(verdict);
                }
                Err(err) => {
                    warn!(domain = %domain, error = %err, "Official source fetch failed");
                    last_error = err;
                }
            }
        }

        Err(last_error)
    }
}
