//! Escalation Queue Builder
//!
//! **[CVT-ESC-010]** Converts a weak or contradicted reconciled verdict
//! into a prioritized manual-review item. The item embeds a full snapshot
//! of the claim and every layer verdict so reviewers work from the
//! evidence as it stood, without re-running the pipeline.
//!
//! # Escalation condition
//! A review item is created iff the reconciled verdict is invalid, OR its
//! confidence is below the configured threshold, OR fewer than two layers
//! executed while the result is invalid. Confidence exactly at the
//! threshold does NOT escalate.

use crate::types::{
    Claim, IssueType, LayerVerdict, ManualReviewItem, ReconciledVerdict, ReviewStatus, Severity,
};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

/// Priority base per severity; the confidence deficit below the threshold
/// is added on top, clamped to 100
const PRIORITY_BASE_CRITICAL: u8 = 90;
const PRIORITY_BASE_HIGH: u8 = 70;
const PRIORITY_BASE_MEDIUM: u8 = 50;
const PRIORITY_BASE_LOW: u8 = 30;

/// Builder for manual-review queue items
#[derive(Default)]
pub struct EscalationBuilder;

impl EscalationBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build a review item, or None when the claim needs no review
    pub fn build_review_item(
        &self,
        claim: &Claim,
        reconciled: &ReconciledVerdict,
        verdicts: &[LayerVerdict],
        confidence_threshold: u8,
    ) -> Option<ManualReviewItem> {
        let escalate = !reconciled.is_valid
            || reconciled.final_confidence < confidence_threshold
            || (verdicts.len() < 2 && !reconciled.is_valid);
        if !escalate {
            return None;
        }

        let severity = severity_for(reconciled, verdicts);
        let issue_type = issue_type_for(reconciled, verdicts);
        let priority = priority_for(severity, reconciled.final_confidence, confidence_threshold);

        let description = format!(
            "{} on field {} requires review: confidence {} against threshold {}; \
             {} hard error(s), {} warning(s) across {} executed layer(s)",
            match issue_type {
                IssueType::ValidationFailed => "validation failure",
                IssueType::LowConfidence => "low-confidence verification",
                IssueType::InsufficientCorroboration => "uncorroborated rejection",
            },
            claim.field,
            reconciled.final_confidence,
            confidence_threshold,
            reconciled.final_errors.len(),
            reconciled.final_warnings.len(),
            verdicts.len(),
        );

        let snapshot = json!({
            "claim": claim,
            "verdicts": verdicts,
            "reconciled": reconciled,
        });

        debug!(
            field = %claim.field,
            severity = severity.as_str(),
            priority,
            "Escalating claim to manual review"
        );

        Some(ManualReviewItem {
            review_id: Uuid::new_v4(),
            entity: claim.entity,
            field: claim.field.clone(),
            issue_type,
            severity,
            priority,
            description,
            snapshot,
            status: ReviewStatus::Pending,
        })
    }
}

/// Critical on any hard error; then warning volume; then confidence
fn severity_for(reconciled: &ReconciledVerdict, verdicts: &[LayerVerdict]) -> Severity {
    if verdicts.iter().any(|v| !v.errors.is_empty()) {
        Severity::Critical
    } else if reconciled.final_warnings.len() > 2 {
        Severity::High
    } else if reconciled.final_confidence < 50 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

fn issue_type_for(reconciled: &ReconciledVerdict, verdicts: &[LayerVerdict]) -> IssueType {
    if !reconciled.is_valid {
        if verdicts.iter().any(|v| !v.errors.is_empty()) {
            IssueType::ValidationFailed
        } else {
            IssueType::InsufficientCorroboration
        }
    } else {
        IssueType::LowConfidence
    }
}

fn priority_for(severity: Severity, confidence: u8, threshold: u8) -> u8 {
    let base = match severity {
        Severity::Critical => PRIORITY_BASE_CRITICAL,
        Severity::High => PRIORITY_BASE_HIGH,
        Severity::Medium => PRIORITY_BASE_MEDIUM,
        Severity::Low => PRIORITY_BASE_LOW,
    };
    base.saturating_add(threshold.saturating_sub(confidence)).min(100)
}
