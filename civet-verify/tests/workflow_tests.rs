// Orchestrator workflow tests
//
// Fail-soft behavior, layer selection flags, cancellation, sink failure
// tolerance, and run idempotence, all with fake sources and no network.

mod helpers;

use chrono::Weekday;
use civet_verify::{Layer, Orchestrator, ValidationOptions};
use helpers::*;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A claim whose rules verdict is valid but below the short-circuit band,
/// so corroboration layers run
fn corroborated_claim() -> civet_verify::Claim {
    // Unknown jurisdiction: rules warn and score 85
    date_claim(Some("ZZ"), next_weekday(Weekday::Tue))
}

// ================================================================================================
// Fail-soft: erroring, panicking, and hanging sources
// ================================================================================================

#[tokio::test]
async fn failing_source_yields_normal_outcome_with_warning() {
    let (orchestrator, _provenance, _reviews) =
        orchestrator_with(vec![FakeSource::failing(Layer::AiCorroboration)]);

    let outcome = orchestrator
        .validate(&corroborated_claim(), &ValidationOptions::default())
        .await;

    assert_eq!(outcome.layers_executed, vec![Layer::Rules]);
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.contains("ai_corroboration corroboration unavailable")));
}

#[tokio::test]
async fn panicking_source_is_contained() {
    let (orchestrator, _provenance, _reviews) =
        orchestrator_with(vec![FakeSource::panicking(Layer::AiCorroboration)]);

    let outcome = orchestrator
        .validate(&corroborated_claim(), &ValidationOptions::default())
        .await;

    assert_eq!(outcome.layers_executed, vec![Layer::Rules]);
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.contains("corroboration unavailable")));
}

#[tokio::test]
async fn hanging_source_is_cut_off_by_the_layer_timeout() {
    let (orchestrator, _provenance, _reviews) =
        orchestrator_with(vec![FakeSource::hanging(Layer::OfficialSources)]);

    let outcome = orchestrator
        .validate(&corroborated_claim(), &ValidationOptions::default())
        .await;

    assert_eq!(outcome.layers_executed, vec![Layer::Rules]);
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.contains("official_sources corroboration unavailable")));
}

#[tokio::test]
async fn one_layer_failing_does_not_stop_the_next() {
    let (orchestrator, _provenance, _reviews) = orchestrator_with(vec![
        FakeSource::failing(Layer::AiCorroboration),
        FakeSource::returning(
            Layer::OfficialSources,
            corroborating_verdict(Layer::OfficialSources, true, 90),
        ),
    ]);

    let outcome = orchestrator
        .validate(&corroborated_claim(), &ValidationOptions::default())
        .await;

    assert_eq!(
        outcome.layers_executed,
        vec![Layer::Rules, Layer::OfficialSources]
    );
    assert!(outcome.is_valid);
    assert_eq!(outcome.final_confidence, 90);
}

// ================================================================================================
// Disabled sources and skip flags
// ================================================================================================

#[tokio::test]
async fn uncredentialed_source_is_skipped_without_warning() {
    let (orchestrator, _provenance, _reviews) =
        orchestrator_with(vec![FakeSource::disabled(Layer::AiCorroboration)]);

    let outcome = orchestrator
        .validate(&corroborated_claim(), &ValidationOptions::default())
        .await;

    assert_eq!(outcome.layers_executed, vec![Layer::Rules]);
    // A disabled layer is configuration, not an incident
    assert!(!outcome
        .warnings
        .iter()
        .any(|w| w.contains("corroboration unavailable")));
}

#[tokio::test]
async fn skip_flags_suppress_registered_sources() {
    let (orchestrator, _provenance, _reviews) = orchestrator_with(vec![
        FakeSource::returning(
            Layer::AiCorroboration,
            corroborating_verdict(Layer::AiCorroboration, true, 85),
        ),
        FakeSource::returning(
            Layer::OfficialSources,
            corroborating_verdict(Layer::OfficialSources, true, 90),
        ),
    ]);

    let options = ValidationOptions {
        skip_ai: true,
        skip_official_sources: true,
        ..ValidationOptions::default()
    };
    let outcome = orchestrator.validate(&corroborated_claim(), &options).await;

    assert_eq!(outcome.layers_executed, vec![Layer::Rules]);
}

#[tokio::test]
async fn force_full_validation_runs_layers_past_a_clean_rules_pass() {
    let claim = date_claim(Some("LA"), next_weekday(Weekday::Sat));
    let (orchestrator, _provenance, _reviews) = orchestrator_with(vec![FakeSource::returning(
        Layer::AiCorroboration,
        corroborating_verdict(Layer::AiCorroboration, true, 85),
    )]);

    let options = ValidationOptions {
        force_full_validation: true,
        ..ValidationOptions::default()
    };
    let outcome = orchestrator.validate(&claim, &options).await;

    assert_eq!(
        outcome.layers_executed,
        vec![Layer::Rules, Layer::AiCorroboration]
    );
    // The clean rules pass still wins reconciliation
    assert_eq!(outcome.final_confidence, 95);
}

// ================================================================================================
// Cancellation
// ================================================================================================

#[tokio::test]
async fn cancellation_is_treated_as_timeout() {
    let token = CancellationToken::new();
    token.cancel();

    let mut registry = civet_verify::SourceRegistry::new();
    registry.register(FakeSource::returning(
        Layer::AiCorroboration,
        corroborating_verdict(Layer::AiCorroboration, true, 85),
    ));
    let provenance = RecordingProvenance::default();
    let reviews = RecordingReviews::default();
    let orchestrator = Orchestrator::new(
        &test_config(),
        registry,
        Arc::new(provenance.clone()),
        Arc::new(reviews.clone()),
    )
    .with_cancellation(token);

    let outcome = orchestrator
        .validate(&corroborated_claim(), &ValidationOptions::default())
        .await;

    // The run still completes: rules executed, corroboration recorded as
    // not executed, result degraded rather than errored
    assert_eq!(outcome.layers_executed, vec![Layer::Rules]);
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.contains("corroboration unavailable")));
}

// ================================================================================================
// Sink failure tolerance
// ================================================================================================

#[tokio::test]
async fn sink_failures_never_fail_the_run() {
    let claim = date_claim(Some("LA"), next_weekday(Weekday::Tue));
    let registry = civet_verify::SourceRegistry::new();
    let orchestrator = Orchestrator::new(
        &test_config(),
        registry,
        Arc::new(FailingProvenance),
        Arc::new(FailingReviews),
    );

    let outcome = orchestrator
        .validate(&claim, &ValidationOptions::default())
        .await;

    // The rejection and its review item survive in the outcome even
    // though both sinks are down
    assert!(!outcome.is_valid);
    assert!(outcome.requires_manual_review);
    assert!(outcome.manual_review_item.is_some());
}

// ================================================================================================
// Provenance
// ================================================================================================

#[tokio::test]
async fn every_executed_layer_leaves_one_provenance_record() {
    let (orchestrator, provenance, _reviews) = orchestrator_with(vec![
        FakeSource::returning(
            Layer::AiCorroboration,
            corroborating_verdict(Layer::AiCorroboration, true, 85),
        ),
        FakeSource::failing(Layer::OfficialSources),
    ]);

    let outcome = orchestrator
        .validate(&corroborated_claim(), &ValidationOptions::default())
        .await;

    // Two layers executed (rules + AI), official failed: two records
    assert_eq!(outcome.layers_executed.len(), 2);
    let records = provenance.0.lock().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].source_id, "rule-engine");
    assert_eq!(records[0].field, "election_date");
}

// ================================================================================================
// Escalation threshold boundary
// ================================================================================================

#[tokio::test]
async fn confidence_at_threshold_does_not_escalate_but_one_below_does() {
    // Unknown jurisdiction: rules verdict valid at 85
    let claim = corroborated_claim();

    let (orchestrator, _provenance, reviews) = orchestrator_with(vec![]);

    // Threshold equal to the reconciled confidence: no escalation
    let at = ValidationOptions {
        confidence_threshold: Some(85),
        ..ValidationOptions::default()
    };
    let outcome = orchestrator.validate(&claim, &at).await;
    assert_eq!(outcome.final_confidence, 85);
    assert!(!outcome.requires_manual_review);
    assert!(reviews.0.lock().unwrap().is_empty());

    // Threshold one above: escalation on confidence grounds
    let above = ValidationOptions {
        confidence_threshold: Some(86),
        ..ValidationOptions::default()
    };
    let outcome = orchestrator.validate(&claim, &above).await;
    assert!(outcome.requires_manual_review);
    assert_eq!(reviews.0.lock().unwrap().len(), 1);
}

// ================================================================================================
// Idempotence
// ================================================================================================

#[tokio::test]
async fn identical_claim_and_responses_verify_identically() {
    let claim = corroborated_claim();
    let (orchestrator, _provenance, _reviews) = orchestrator_with(vec![FakeSource::returning(
        Layer::AiCorroboration,
        corroborating_verdict(Layer::AiCorroboration, true, 85),
    )]);

    let first = orchestrator
        .validate(&claim, &ValidationOptions::default())
        .await;
    let second = orchestrator
        .validate(&claim, &ValidationOptions::default())
        .await;

    assert_eq!(first.is_valid, second.is_valid);
    assert_eq!(first.final_confidence, second.final_confidence);
    assert_eq!(first.layers_executed, second.layers_executed);
    assert_eq!(first.errors, second.errors);
    assert_eq!(first.warnings, second.warnings);
}
