//! Shared test fixtures: fake corroboration sources, recording sinks, and
//! claim builders. No network anywhere.

#![allow(dead_code)]

use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, Utc, Weekday};
use civet_common::config::Timeouts;
use civet_common::VerifyConfig;
use civet_verify::{
    Claim, CorroborationError, CorroborationSource, EntityKind, Layer, LayerVerdict,
    ManualReviewItem, Orchestrator, ProvenanceRecord, ProvenanceSink, ReviewSink, SourceRegistry,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// What a fake source does when called
pub enum FakeBehavior {
    /// Return this verdict
    Return(LayerVerdict),
    /// Fail with a transport error
    Fail,
    /// Panic inside the call
    Panic,
    /// Never resolve within any reasonable timeout
    Hang,
}

/// Scriptable corroboration source
pub struct FakeSource {
    pub layer: Layer,
    pub behavior: FakeBehavior,
    pub enabled: bool,
}

impl FakeSource {
    pub fn returning(layer: Layer, verdict: LayerVerdict) -> Arc<dyn CorroborationSource> {
        Arc::new(Self {
            layer,
            behavior: FakeBehavior::Return(verdict),
            enabled: true,
        })
    }

    pub fn failing(layer: Layer) -> Arc<dyn CorroborationSource> {
        Arc::new(Self {
            layer,
            behavior: FakeBehavior::Fail,
            enabled: true,
        })
    }

    pub fn panicking(layer: Layer) -> Arc<dyn CorroborationSource> {
        Arc::new(Self {
            layer,
            behavior: FakeBehavior::Panic,
            enabled: true,
        })
    }

    pub fn hanging(layer: Layer) -> Arc<dyn CorroborationSource> {
        Arc::new(Self {
            layer,
            behavior: FakeBehavior::Hang,
            enabled: true,
        })
    }

    pub fn disabled(layer: Layer) -> Arc<dyn CorroborationSource> {
        Arc::new(Self {
            layer,
            behavior: FakeBehavior::Fail,
            enabled: false,
        })
    }
}

#[async_trait::async_trait]
impl CorroborationSource for FakeSource {
    fn layer(&self) -> Layer {
        self.layer
    }

    fn source_id(&self) -> &'static str {
        "fake-source"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn corroborate(
        &self,
        _claim: &Claim,
        _timeout: Duration,
    ) -> Result<LayerVerdict, CorroborationError> {
        match &self.behavior {
            FakeBehavior::Return(verdict) => Ok(verdict.clone()),
            FakeBehavior::Fail => Err(CorroborationError::Network("fake outage".to_string())),
            FakeBehavior::Panic => panic!("fake source panic"),
            FakeBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(CorroborationError::Timeout)
            }
        }
    }
}

/// Provenance sink recording every record
#[derive(Default, Clone)]
pub struct RecordingProvenance(pub Arc<Mutex<Vec<ProvenanceRecord>>>);

impl ProvenanceSink for RecordingProvenance {
    fn record(&self, record: ProvenanceRecord) -> anyhow::Result<()> {
        self.0.lock().unwrap().push(record);
        Ok(())
    }
}

/// Provenance sink that always fails
pub struct FailingProvenance;

impl ProvenanceSink for FailingProvenance {
    fn record(&self, _record: ProvenanceRecord) -> anyhow::Result<()> {
        anyhow::bail!("provenance store unreachable")
    }
}

/// Review sink recording every enqueued item
#[derive(Default, Clone)]
pub struct RecordingReviews(pub Arc<Mutex<Vec<ManualReviewItem>>>);

impl ReviewSink for RecordingReviews {
    fn enqueue(&self, item: ManualReviewItem) -> anyhow::Result<()> {
        self.0.lock().unwrap().push(item);
        Ok(())
    }
}

/// Review sink that always fails
pub struct FailingReviews;

impl ReviewSink for FailingReviews {
    fn enqueue(&self, _item: ManualReviewItem) -> anyhow::Result<()> {
        anyhow::bail!("review queue unreachable")
    }
}

/// Config with test-sized corroboration timeouts
pub fn test_config() -> VerifyConfig {
    VerifyConfig {
        timeouts: Timeouts {
            ai_ms: 250,
            official_ms: 250,
        },
        ..VerifyConfig::default()
    }
}

/// Orchestrator over the given fake sources, with recording sinks
pub fn orchestrator_with(
    sources: Vec<Arc<dyn CorroborationSource>>,
) -> (Orchestrator, RecordingProvenance, RecordingReviews) {
    let mut registry = SourceRegistry::new();
    for source in sources {
        registry.register(source);
    }
    let provenance = RecordingProvenance::default();
    let reviews = RecordingReviews::default();
    let orchestrator = Orchestrator::new(
        &test_config(),
        registry,
        Arc::new(provenance.clone()),
        Arc::new(reviews.clone()),
    );
    (orchestrator, provenance, reviews)
}

/// Next occurrence of `day` strictly after today (always inside the
/// plausibility window)
pub fn next_weekday(day: Weekday) -> NaiveDate {
    let mut date = Utc::now().date_naive() + ChronoDuration::days(1);
    while date.weekday() != day {
        date = date + ChronoDuration::days(1);
    }
    date
}

/// Election-date claim for a jurisdiction
pub fn date_claim(state: Option<&str>, date: NaiveDate) -> Claim {
    Claim::date(
        EntityKind::Election,
        Uuid::new_v4(),
        state,
        "election_date",
        date,
    )
}

/// Corroboration verdict with canned citations
pub fn corroborating_verdict(layer: Layer, is_valid: bool, confidence: u8) -> LayerVerdict {
    let mut verdict = LayerVerdict::new(layer, is_valid, confidence);
    verdict.sources_checked = vec![
        "https://sos.la.gov/elections".to_string(),
        "https://voterportal.sos.la.gov".to_string(),
    ];
    verdict
}
