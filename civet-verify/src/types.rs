//! Core Types and Trait Definitions for CIVET-VERIFY
//!
//! Defines the data model and base traits for the 3-layer verification
//! architecture:
//! - **Layer 1:** deterministic rule engine
//! - **Layer 2:** AI-assisted corroboration
//! - **Layer 3:** official-source corroboration
//!
//! # Architecture
//! Per-claim verification workflow:
//! - Rules always run synchronously and produce the first verdict
//! - Corroboration layers run sequentially, each independently fail-soft
//! - Verdicts are reconciled into one result; weak or contradicted results
//!   escalate to manual review
//!
//! Every value here is immutable per run: verdicts and provenance records
//! are produced once and handed to sinks, never updated in place.

use crate::error::CorroborationError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

// ============================================================================
// Claims
// ============================================================================

/// Kind of entity a claim is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Election,
    Candidate,
    BallotMeasure,
    PollingPlace,
}

/// Reference to the entity a claim is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: Uuid,
}

/// Claimed value under verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimValue {
    /// A claimed calendar date (e.g. an election date)
    Date(NaiveDate),
    /// A claimed free-text value (e.g. a polling place address)
    Text(String),
}

impl fmt::Display for ClaimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimValue::Date(d) => write!(f, "{}", d),
            ClaimValue::Text(t) => write!(f, "{}", t),
        }
    }
}

/// A single fact awaiting verification
///
/// **[CVT-VER-010]** Claims are immutable inputs constructed fresh per
/// call; they carry no persistent identity of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub entity: EntityRef,
    /// USPS jurisdiction code (e.g. "LA"); None for claims with no
    /// jurisdictional scope
    pub jurisdiction: Option<String>,
    /// Field name the claim asserts a value for (e.g. "election_date")
    pub field: String,
    pub value: ClaimValue,
}

impl Claim {
    /// Claim asserting a date-valued field
    pub fn date(
        kind: EntityKind,
        id: Uuid,
        jurisdiction: Option<&str>,
        field: impl Into<String>,
        value: NaiveDate,
    ) -> Self {
        Self {
            entity: EntityRef { kind, id },
            jurisdiction: jurisdiction.map(str::to_string),
            field: field.into(),
            value: ClaimValue::Date(value),
        }
    }

    /// Claim asserting a text-valued field
    pub fn text(
        kind: EntityKind,
        id: Uuid,
        jurisdiction: Option<&str>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            entity: EntityRef { kind, id },
            jurisdiction: jurisdiction.map(str::to_string),
            field: field.into(),
            value: ClaimValue::Text(value.into()),
        }
    }
}

// ============================================================================
// Layer Verdicts
// ============================================================================

/// One independent verification strategy
///
/// The ordinal drives reconciliation tie-breaking: lower layers are more
/// deterministic and win ties against higher layers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Rules = 1,
    AiCorroboration = 2,
    OfficialSources = 3,
}

impl Layer {
    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// Canonical source identifier for provenance when a verdict lists no
    /// sources of its own
    pub fn canonical_source(&self) -> &'static str {
        match self {
            Layer::Rules => "rule-engine",
            Layer::AiCorroboration => "ai-search",
            Layer::OfficialSources => "official-sites",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Rules => write!(f, "rules"),
            Layer::AiCorroboration => write!(f, "ai_corroboration"),
            Layer::OfficialSources => write!(f, "official_sources"),
        }
    }
}

/// A layer's judgment on a claim
///
/// **[CVT-VER-020]** Produced once per executed layer, never mutated.
/// Hard constraint violations and contradictions are carried as error
/// strings; recoverable oddities as warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerVerdict {
    pub layer: Layer,
    pub is_valid: bool,
    /// Confidence score 0-100
    pub confidence: u8,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Sources consulted to form this verdict (domains, endpoints, or the
    /// layer's canonical identifier)
    pub sources_checked: Vec<String>,
}

impl LayerVerdict {
    /// New verdict with confidence clamped to 0-100
    pub fn new(layer: Layer, is_valid: bool, confidence: u8) -> Self {
        Self {
            layer,
            is_valid,
            confidence: confidence.min(100),
            errors: Vec::new(),
            warnings: Vec::new(),
            sources_checked: Vec::new(),
        }
    }

    /// Primary source identifier for provenance
    pub fn primary_source(&self) -> String {
        self.sources_checked
            .first()
            .cloned()
            .unwrap_or_else(|| self.layer.canonical_source().to_string())
    }
}

/// Merged result of all executed layer verdicts; derived and ephemeral
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciledVerdict {
    pub is_valid: bool,
    /// Confidence of the selected (highest-confidence) verdict
    pub final_confidence: u8,
    /// Empty when valid; otherwise the union of every invalid verdict's
    /// errors, so dissenting evidence is never dropped
    pub final_errors: Vec<String>,
    pub final_warnings: Vec<String>,
    /// True when at least one valid and one invalid verdict coexist
    pub disagreement_detected: bool,
}

// ============================================================================
// Provenance
// ============================================================================

/// Append-only audit entry: which source observed which value, when
///
/// One record per executed layer per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub entity: EntityRef,
    pub field: String,
    pub source_id: String,
    pub observed_value: String,
    pub observed_at: DateTime<Utc>,
}

// ============================================================================
// Manual Review
// ============================================================================

/// Why a claim was routed to manual review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// At least one layer reported a hard constraint violation or
    /// contradiction
    ValidationFailed,
    /// The claim verified but below the configured confidence threshold
    LowConfidence,
    /// The rule layer rejected the claim and no corroboration was available
    InsufficientCorroboration,
}

/// Review item severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Review workflow status
///
/// Created as `Pending` here; every later transition belongs to the review
/// subsystem, not to this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    InReview,
    Resolved,
    Dismissed,
}

/// A prioritized human-review queue entry
///
/// **[CVT-ESC-010]** Embeds a full snapshot of the claim and every layer
/// verdict so a reviewer never has to re-run the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualReviewItem {
    pub review_id: Uuid,
    pub entity: EntityRef,
    pub field: String,
    pub issue_type: IssueType,
    pub severity: Severity,
    /// Queue priority 0-100, higher first
    pub priority: u8,
    pub description: String,
    /// Full claim + verdict snapshot (JSON)
    pub snapshot: serde_json::Value,
    pub status: ReviewStatus,
}

// ============================================================================
// External Contracts
// ============================================================================

/// A pluggable corroboration evidence source (Layers 2 and 3)
///
/// Implementations wrap one unreliable, rate-limited external source. A
/// call that cannot produce evidence must return `Err`, never a
/// fabricated verdict; the orchestrator maps failure to "layer did not
/// execute" plus a warning.
#[async_trait::async_trait]
pub trait CorroborationSource: Send + Sync {
    /// Layer this source corroborates for
    fn layer(&self) -> Layer;

    /// Stable source identifier for provenance and logging
    fn source_id(&self) -> &'static str;

    /// False when the source cannot run at all (e.g. missing credentials);
    /// a disabled source is treated as a disabled layer, without a warning
    fn is_enabled(&self) -> bool {
        true
    }

    /// Corroborate a claim within the given budget.
    ///
    /// # Errors
    /// Any transport, credential, rate-limit, or parse failure. The error
    /// never aborts the verification run.
    async fn corroborate(
        &self,
        claim: &Claim,
        timeout: Duration,
    ) -> Result<LayerVerdict, CorroborationError>;
}

/// Audit sink for provenance records
///
/// Fire-and-forget: implementations may buffer or drop; a sink failure is
/// logged and never fails validation.
pub trait ProvenanceSink: Send + Sync {
    fn record(&self, record: ProvenanceRecord) -> anyhow::Result<()>;
}

/// Sink for escalated manual-review items
pub trait ReviewSink: Send + Sync {
    fn enqueue(&self, item: ManualReviewItem) -> anyhow::Result<()>;
}

// ============================================================================
// Tests
// ============================================================================
