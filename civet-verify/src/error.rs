//! Error types for the verification engine
//!
//! **[CVT-ERR-010]** Hard constraint violations are verdict data, not
//! errors: Layer 1 reports them as strings inside its `LayerVerdict`.
//! `CorroborationError` covers everything that can go wrong while
//! gathering external evidence; the orchestrator recovers every variant
//! locally as a warning, so nothing here ever aborts a verification run.

use thiserror::Error;

/// Failure while corroborating a claim against an external source
#[derive(Debug, Error)]
pub enum CorroborationError {
    /// Call exceeded its budget (or was cancelled, which is treated
    /// identically)
    #[error("corroboration timed out")]
    Timeout,

    /// Transport-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Source requires credentials that are not configured
    #[error("credentials missing for corroboration source")]
    MissingCredentials,

    /// Upstream rejected the call for rate-limit reasons
    #[error("rate limit exceeded")]
    RateLimited,

    /// Upstream returned a non-success status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Response shape or content could not be interpreted (parse ambiguity)
    #[error("response could not be parsed: {0}")]
    Parse(String),

    /// No usable source configured for this claim (e.g. jurisdiction with
    /// no allowlisted official domain)
    #[error("source not configured: {0}")]
    NotConfigured(String),
}
