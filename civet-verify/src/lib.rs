//! civet-verify - Claim Verification Engine
//!
//! **Module Identity:**
//! - Name: civet-verify (Claim Verification)
//! - Consumers: data ingest, review dashboard, public API services
//!
//! **[CVT-OV-010]** Produces one confidence-scored verdict per claimed
//! fact by combining a deterministic rule layer, an AI-assisted
//! corroboration layer, and an official-source corroboration layer, then
//! reconciling disagreeing evidence and escalating weak or contradicted
//! claims to a manual-review queue.
//!
//! **[CVT-OV-020]** Any subset of corroboration sources may be
//! unavailable; verification always completes with whatever evidence was
//! gathered (the rule layer at minimum).

pub mod config;
pub mod corroboration;
pub mod error;
pub mod escalation;
pub mod reconcile;
pub mod rules;
pub mod types;
pub mod workflow;

pub use crate::corroboration::SourceRegistry;
pub use crate::error::CorroborationError;
pub use crate::escalation::EscalationBuilder;
pub use crate::reconcile::Reconciler;
pub use crate::rules::RuleEngine;
pub use crate::types::{
    Claim, ClaimValue, CorroborationSource, EntityKind, EntityRef, IssueType, Layer,
    LayerVerdict, ManualReviewItem, ProvenanceRecord, ProvenanceSink, ReconciledVerdict,
    ReviewSink, ReviewStatus, Severity,
};
pub use crate::workflow::{Orchestrator, RunState, ValidationOptions, ValidationOutcome};
