//! Verification Orchestrator
//!
//! **[CVT-ORC-010]** Small state machine deciding which layers run,
//! enforcing per-layer timeouts, invoking the reconciler and escalation
//! builder, and emitting provenance records.
//!
//! # Error Handling
//! The orchestrator itself never fails a run: corroboration failures
//! (timeout, transport, credentials, parse, panic, cancellation) are
//! recovered locally as warnings and the layer is recorded as not
//! executed. Insufficient evidence degrades to "requires manual review",
//! never to an error.
//!
//! # Concurrency
//! Layers run sequentially: the corroboration targets are independently
//! rate-limited, so running Layers 2 and 3 concurrently would mostly
//! raise the odds of simultaneous rate-limit rejection. Independent runs
//! of `validate` may execute concurrently; the orchestrator holds no
//! shared mutable state.

use super::{RunState, ValidationOptions, ValidationOutcome};
use crate::corroboration::SourceRegistry;
use crate::error::CorroborationError;
use crate::escalation::EscalationBuilder;
use crate::reconcile::Reconciler;
use crate::rules::RuleEngine;
use crate::types::{
    Claim, CorroborationSource, Layer, LayerVerdict, ProvenanceRecord, ProvenanceSink, ReviewSink,
};
use chrono::Utc;
use civet_common::VerifyConfig;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A valid rule verdict at or above this confidence skips corroboration
const SHORT_CIRCUIT_CONFIDENCE: u8 = 90;

/// Claim verification orchestrator; the sole entry point of the engine
pub struct Orchestrator {
    rules: RuleEngine,
    registry: SourceRegistry,
    reconciler: Reconciler,
    escalation: EscalationBuilder,
    provenance: Arc<dyn ProvenanceSink>,
    reviews: Arc<dyn ReviewSink>,
    ai_timeout: Duration,
    official_timeout: Duration,
    default_threshold: u8,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        config: &VerifyConfig,
        registry: SourceRegistry,
        provenance: Arc<dyn ProvenanceSink>,
        reviews: Arc<dyn ReviewSink>,
    ) -> Self {
        Self {
            rules: RuleEngine::new(&config.rules),
            registry,
            reconciler: Reconciler::new(),
            escalation: EscalationBuilder::new(),
            provenance,
            reviews,
            ai_timeout: config.timeouts.ai(),
            official_timeout: config.timeouts.official(),
            default_threshold: config.thresholds.confidence_threshold,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach a cancellation token. Cancellation observed at a
    /// corroboration suspension point is treated identically to a
    /// timeout: the layer is recorded as not executed and the run
    /// completes normally.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Verify one claim through the layer pipeline.
    ///
    /// Always returns an outcome; validation-domain failures surface as
    /// errors/warnings inside it, never as a panic or `Err`.
    pub async fn validate(
        &self,
        claim: &Claim,
        options: &ValidationOptions,
    ) -> ValidationOutcome {
        let threshold = options
            .confidence_threshold
            .unwrap_or(self.default_threshold);
        let mut state = RunState::Init;
        let mut verdicts: Vec<LayerVerdict> = Vec::new();
        let mut run_warnings: Vec<String> = Vec::new();

        // Layer 1 always runs
        let rule_verdict = self.rules.validate(claim);
        self.record_provenance(claim, &rule_verdict);
        let short_circuit = rule_verdict.is_valid
            && rule_verdict.confidence >= SHORT_CIRCUIT_CONFIDENCE
            && !options.force_full_validation;
        verdicts.push(rule_verdict);
        advance(&mut state, RunState::RulesDone);

        if short_circuit {
            advance(&mut state, RunState::ShortCircuit);
        } else {
            advance(&mut state, RunState::AiPending);
            if !options.skip_ai {
                self.run_layer(
                    Layer::AiCorroboration,
                    claim,
                    self.ai_timeout,
                    &mut verdicts,
                    &mut run_warnings,
                )
                .await;
            }

            advance(&mut state, RunState::OfficialPending);
            if !options.skip_official_sources {
                self.run_layer(
                    Layer::OfficialSources,
                    claim,
                    self.official_timeout,
                    &mut verdicts,
                    &mut run_warnings,
                )
                .await;
            }
        }

        advance(&mut state, RunState::Reconciled);
        let mut reconciled = self.reconciler.reconcile(&verdicts);
        // Layer-unavailable warnings belong to the run's result and count
        // toward review severity
        reconciled.final_warnings.extend(run_warnings);

        // The short-circuit path checks escalation too, so the review
        // invariant holds even under a nonstandard threshold
        let manual_review_item =
            self.escalation
                .build_review_item(claim, &reconciled, &verdicts, threshold);

        if let Some(item) = &manual_review_item {
            if let Err(err) = self.reviews.enqueue(item.clone()) {
                warn!(error = %err, "Review sink failed; item kept in outcome");
            }
            advance(&mut state, RunState::Escalated);
        } else {
            advance(&mut state, RunState::Done);
        }

        info!(
            field = %claim.field,
            is_valid = reconciled.is_valid,
            confidence = reconciled.final_confidence,
            layers = verdicts.len(),
            escalated = manual_review_item.is_some(),
            "Claim verification complete"
        );

        ValidationOutcome {
            is_valid: reconciled.is_valid,
            final_confidence: reconciled.final_confidence,
            layers_executed: verdicts.iter().map(|v| v.layer).collect(),
            errors: reconciled.final_errors.clone(),
            warnings: reconciled.final_warnings.clone(),
            requires_manual_review: manual_review_item.is_some(),
            manual_review_item,
            verdicts,
        }
    }

    /// Run one corroboration layer fail-soft: a failure leaves the layer
    /// out of the executed set and adds a warning
    async fn run_layer(
        &self,
        layer: Layer,
        claim: &Claim,
        timeout: Duration,
        verdicts: &mut Vec<LayerVerdict>,
        warnings: &mut Vec<String>,
    ) {
        let Some(source) = self.registry.get(layer) else {
            debug!(%layer, "no corroboration source registered; layer disabled");
            return;
        };
        if !source.is_enabled() {
            debug!(%layer, source = source.source_id(), "source disabled (uncredentialed)");
            return;
        }

        match self.call_source(source.as_ref(), claim, timeout).await {
            Ok(verdict) => {
                self.record_provenance(claim, &verdict);
                verdicts.push(verdict);
            }
            Err(err) => {
                warn!(%layer, error = %err, "corroboration layer did not execute");
                warnings.push(format!("{} corroboration unavailable: {}", layer, err));
            }
        }
    }

    /// Invoke a source with the layer timeout, converting cancellation,
    /// elapsed timers, and panics into `CorroborationError`
    async fn call_source(
        &self,
        source: &dyn CorroborationSource,
        claim: &Claim,
        timeout: Duration,
    ) -> Result<LayerVerdict, CorroborationError> {
        let call = AssertUnwindSafe(source.corroborate(claim, timeout)).catch_unwind();

        tokio::select! {
            _ = self.cancel.cancelled() => Err(CorroborationError::Timeout),
            outcome = tokio::time::timeout(timeout, call) => match outcome {
                Err(_elapsed) => Err(CorroborationError::Timeout),
                Ok(Err(_panic)) => Err(CorroborationError::Network(
                    "corroboration source panicked".to_string(),
                )),
                Ok(Ok(result)) => result,
            },
        }
    }

    /// One provenance record per executed layer; sink failures never fail
    /// the run
    fn record_provenance(&self, claim: &Claim, verdict: &LayerVerdict) {
        let record = ProvenanceRecord {
            entity: claim.entity,
            field: claim.field.clone(),
            source_id: verdict.primary_source(),
            observed_value: claim.value.to_string(),
            observed_at: Utc::now(),
        };
        if let Err(err) = self.provenance.record(record) {
            warn!(error = %err, "Provenance sink failed; continuing");
        }
    }
}

fn advance(state: &mut RunState, next: RunState) {
    debug!(from = ?state, to = ?next, "verification state transition");
    *state = next;
}
