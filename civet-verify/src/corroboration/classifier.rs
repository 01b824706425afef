//! Evidence Classification Heuristics
//!
//! **[CVT-COR-020]** Corroboration sources return unstructured natural
//! language or HTML with no schema, so classification is phrase-based:
//! confirmation phrases against contradiction phrases, with explicit
//! handling for responses carrying both.
//!
//! # Confidence
//! A layer's confidence starts at its static source prior, is decayed by
//! evidence staleness when a timestamp is available, and is capped low when
//! the response carries no citation. A response containing both confirming
//! and contradicting language is classified `Ambiguous` and becomes a
//! low-confidence pass-through with a warning, never silently resolved
//! toward either side.

use crate::types::{ClaimValue, Layer, LayerVerdict};
use chrono::{DateTime, NaiveDate, Utc};

/// Confidence cap when the response has no explicit citation
pub const NO_CITATION_CAP: u8 = 60;
/// Confidence cap for ambiguous or unclassifiable responses
pub const AMBIGUITY_CAP: u8 = 40;
/// Evidence younger than this decays nothing
const STALENESS_GRACE_DAYS: i64 = 30;
/// Total staleness decay never exceeds this many points
const MAX_STALENESS_DECAY: i64 = 30;
/// Jaro-Winkler similarity at or above this counts as text agreement
const TEXT_AGREEMENT_SIMILARITY: f64 = 0.85;

/// Multi-word confirmation phrases, matched as substrings
const CONFIRM_PHRASES: &[&str] = &[
    "is correct",
    "that is correct",
    "is accurate",
    "is confirmed",
    "confirms that",
    "is scheduled for",
    "will be held on",
    "will take place on",
    "matches the official",
];

/// Multi-word contradiction phrases, matched as substrings
const CONTRADICT_PHRASES: &[&str] = &[
    "is incorrect",
    "is not correct",
    "is wrong",
    "no longer",
    "has been postponed",
    "has been rescheduled",
    "has been moved",
    "was moved to",
    "does not match",
    "contradicts",
    "is outdated",
];

/// Single-token confirmations/contradictions, matched whole-word so "yes"
/// never fires on "yesterday"
const CONFIRM_WORDS: &[&str] = &["yes", "correct", "confirmed"];
const CONTRADICT_WORDS: &[&str] = &["no", "incorrect"];

/// How a response relates to the claim under verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assessment {
    /// Response affirms the claimed value
    Confirms,
    /// Response disputes the claimed value
    Contradicts,
    /// Response carries both confirming and contradicting language
    Ambiguous,
    /// No classifiable language found
    Unknown,
}

/// Signals extracted from one corroboration response
#[derive(Debug, Clone)]
pub struct EvidenceSignals {
    pub assessment: Assessment,
    /// Outcome of comparing an explicitly reported value against the
    /// claim; None when the response reports no comparable value
    pub value_agreement: Option<bool>,
    pub has_citation: bool,
    /// Timestamp of the underlying evidence, where the source provides one
    pub observed_at: Option<DateTime<Utc>>,
}

/// Classify response text by confirmation/contradiction phrase counts
pub fn classify(text: &str) -> Assessment {
    let lower = text.to_lowercase();

    let mut confirm_hits = CONFIRM_PHRASES.iter().filter(|p| lower.contains(**p)).count();
    let mut contradict_hits = CONTRADICT_PHRASES
        .iter()
        .filter(|p| lower.contains(**p))
        .count();

    for token in lower
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
    {
        if CONFIRM_WORDS.contains(&token) {
            confirm_hits += 1;
        }
        if CONTRADICT_WORDS.contains(&token) {
            contradict_hits += 1;
        }
    }

    match (confirm_hits > 0, contradict_hits > 0) {
        (true, true) => Assessment::Ambiguous,
        (true, false) => Assessment::Confirms,
        (false, true) => Assessment::Contradicts,
        (false, false) => Assessment::Unknown,
    }
}

/// Whether the response carries an explicit citation
pub fn has_citation_markers(text: &str, citations: &[String]) -> bool {
    if !citations.is_empty() {
        return true;
    }
    let lower = text.to_lowercase();
    lower.contains("http://") || lower.contains("https://") || lower.contains("according to")
}

/// Decay a source prior by evidence staleness.
///
/// Evidence up to 30 days old decays nothing; beyond that, one point per
/// additional week, capped at 30 points total.
pub fn staleness_decay(prior: u8, observed_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u8 {
    let Some(observed_at) = observed_at else {
        return prior;
    };

    let age_days = (now - observed_at).num_days();
    if age_days <= STALENESS_GRACE_DAYS {
        return prior;
    }

    let decay = ((age_days - STALENESS_GRACE_DAYS) / 7).min(MAX_STALENESS_DECAY);
    prior.saturating_sub(decay as u8)
}

/// Compare an explicitly reported value against the claimed one.
///
/// Dates compare exactly (ISO form); text compares by Jaro-Winkler
/// similarity. Returns None when the observed value is absent or
/// unparseable: no agreement signal either way.
pub fn value_agreement(claimed: &ClaimValue, observed: Option<&str>) -> Option<bool> {
    let observed = observed?.trim();
    if observed.is_empty() {
        return None;
    }

    match claimed {
        ClaimValue::Date(date) => NaiveDate::parse_from_str(observed, "%Y-%m-%d")
            .ok()
            .map(|parsed| parsed == *date),
        ClaimValue::Text(text) => {
            let similarity =
                strsim::jaro_winkler(&text.to_lowercase(), &observed.to_lowercase());
            Some(similarity >= TEXT_AGREEMENT_SIMILARITY)
        }
    }
}

/// Build a layer verdict from extracted evidence signals.
///
/// An explicit observed-value comparison outranks phrase classification;
/// phrase classification applies only when the response reports no
/// comparable value.
pub fn score_evidence(
    layer: Layer,
    source_id: &str,
    prior: u8,
    signals: &EvidenceSignals,
    now: DateTime<Utc>,
) -> LayerVerdict {
    let mut warnings: Vec<String> = Vec::new();
    let mut errors: Vec<String> = Vec::new();

    let mut confidence = staleness_decay(prior, signals.observed_at, now);
    if confidence < prior {
        let age_days = signals
            .observed_at
            .map(|t| (now - t).num_days())
            .unwrap_or(0);
        warnings.push(format!(
            "evidence is {} days old; confidence decayed from {} to {}",
            age_days, prior, confidence
        ));
    }

    if !signals.has_citation {
        confidence = confidence.min(NO_CITATION_CAP);
        warnings.push("no explicit citation in response; confidence capped".to_string());
    }

    let is_valid = match (signals.value_agreement, signals.assessment) {
        (Some(false), _) => {
            errors.push("source reports a different value than claimed".to_string());
            false
        }
        (Some(true), assessment) => {
            if assessment == Assessment::Contradicts {
                warnings.push(
                    "response language contradicts while the reported value matches the claim"
                        .to_string(),
                );
            }
            true
        }
        (None, Assessment::Confirms) => true,
        (None, Assessment::Contradicts) => {
            errors.push("source contradicts the claimed value".to_string());
            false
        }
        (None, Assessment::Ambiguous) => {
            confidence = confidence.min(AMBIGUITY_CAP);
            warnings.push(
                "response contains both confirming and contradicting language; treated as ambiguous"
                    .to_string(),
            );
            true
        }
        (None, Assessment::Unknown) => {
            confidence = confidence.min(AMBIGUITY_CAP);
            warnings.push("response could not be confidently classified".to_string());
            true
        }
    };

    let mut verdict = LayerVerdict::new(layer, is_valid, confidence);
    verdict.errors = errors;
    verdict.warnings = warnings;
    verdict.sources_checked = vec![source_id.to_string()];
    verdict
}
