//! Verification Workflow
//!
//! Orchestrates the complete 3-layer verification pipeline for one claim:
//! rules (Layer 1), AI corroboration (Layer 2), official-source
//! corroboration (Layer 3), then reconciliation and escalation.

pub mod orchestrator;

pub use orchestrator::Orchestrator;

use crate::types::{Layer, LayerVerdict, ManualReviewItem};
use serde::{Deserialize, Serialize};

/// Orchestrator state machine states
///
/// `Init → RulesDone → (ShortCircuit | AiPending) → OfficialPending →
/// Reconciled → (Done | Escalated)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Init,
    RulesDone,
    ShortCircuit,
    AiPending,
    OfficialPending,
    Reconciled,
    Done,
    Escalated,
}

/// Caller options for one verification run
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Skip the AI corroboration layer
    pub skip_ai: bool,
    /// Skip the official-source corroboration layer
    pub skip_official_sources: bool,
    /// Run all layers even when the rule layer alone would short-circuit
    pub force_full_validation: bool,
    /// Escalation threshold override; None uses the configured value
    /// (default 70)
    pub confidence_threshold: Option<u8>,
}

/// Result of one verification run
///
/// Always produced: external failures degrade to warnings and manual
/// review, never to an error from `validate`.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub final_confidence: u8,
    /// Layers that actually produced a verdict, in execution order
    pub layers_executed: Vec<Layer>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub requires_manual_review: bool,
    pub manual_review_item: Option<ManualReviewItem>,
    /// Every layer verdict, for audit and snapshot purposes
    pub verdicts: Vec<LayerVerdict>,
}
