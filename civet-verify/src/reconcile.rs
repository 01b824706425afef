//! Verdict Reconciler
//!
//! **[CVT-REC-010]** Merges every executed layer verdict into one
//! authoritative result. Pure, deterministic, synchronous, and
//! order-independent: the same multiset of verdicts reconciles to the
//! same result regardless of execution order.
//!
//! # Algorithm
//! 1. Select the verdict with maximum confidence; ties go to the lowest
//!    layer number (deterministic rules outrank AI).
//! 2. The result is valid only if the selected verdict is valid AND its
//!    confidence meets the fixed pass threshold.
//! 3. When invalid, errors are the union of EVERY invalid verdict's
//!    errors, so dissenting evidence is never dropped.
//! 4. Warnings are the union of all verdicts' warnings, plus a
//!    synthesized disagreement warning when valid and invalid verdicts
//!    coexist.
//!
//! One strong corroborating source may override a weaker rule-based
//! rejection; the rejection stays visible in warnings and the audit trail.

use crate::types::{LayerVerdict, ReconciledVerdict};

/// Fixed pass threshold. Intentionally independent of the configurable
/// escalation threshold: a verdict below this is never reported valid,
/// whatever the deployment configuration says about escalation.
pub const PASS_CONFIDENCE_THRESHOLD: u8 = 70;

/// Pure verdict reconciler
#[derive(Default)]
pub struct Reconciler;

impl Reconciler {
    pub fn new() -> Self {
        Self
    }

    pub fn reconcile(&self, verdicts: &[LayerVerdict]) -> ReconciledVerdict {
        let Some(selected) = select_verdict(verdicts) else {
            return ReconciledVerdict {
                is_valid: false,
                final_confidence: 0,
                final_errors: vec!["no verdicts to reconcile".to_string()],
                final_warnings: Vec::new(),
                disagreement_detected: false,
            };
        };

        let is_valid = selected.is_valid && selected.confidence >= PASS_CONFIDENCE_THRESHOLD;

        // Layer-ordered iteration keeps the output deterministic whatever
        // order the verdicts arrived in
        let mut ordered: Vec<&LayerVerdict> = verdicts.iter().collect();
        ordered.sort_by_key(|v| v.layer.number());

        let final_errors = if is_valid {
            Vec::new()
        } else {
            dedup_in_order(
                ordered
                    .iter()
                    .filter(|v| !v.is_valid)
                    .flat_map(|v| v.errors.iter().cloned()),
            )
        };

        let mut final_warnings =
            dedup_in_order(ordered.iter().flat_map(|v| v.warnings.iter().cloned()));

        let valid_count = verdicts.iter().filter(|v| v.is_valid).count();
        let invalid_count = verdicts.len() - valid_count;
        let disagreement_detected = valid_count > 0 && invalid_count > 0;
        if disagreement_detected {
            final_warnings.push(format!(
                "layers disagree: {} valid, {} invalid",
                valid_count, invalid_count
            ));
        }

        ReconciledVerdict {
            is_valid,
            final_confidence: selected.confidence,
            final_errors,
            final_warnings,
            disagreement_detected,
        }
    }
}

/// Highest confidence wins; ties go to the lowest layer number
fn select_verdict(verdicts: &[LayerVerdict]) -> Option<&LayerVerdict> {
    verdicts.iter().fold(None, |best, v| match best {
        None => Some(v),
        Some(b)
            if v.confidence > b.confidence
                || (v.confidence == b.confidence && v.layer.number() < b.layer.number()) =>
        {
            Some(v)
        }
        other => other,
    })
}

fn dedup_in_order(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
