//! Rule Engine (Layer 1)
//!
//! **[CVT-RULE-010]** Pure, deterministic constraint checking: no I/O, no
//! clock access beyond the injected "today", sub-millisecond. Encodes
//! jurisdiction day-of-week constraints, date plausibility, and
//! placeholder detection for free-text fields.
//!
//! # Scoring
//! A clean pass scores 95. Each violated constraint lowers confidence and
//! appends a human-readable error; warnings deduct a small amount so an
//! uncertain rules pass (e.g. unknown jurisdiction) drops below the
//! short-circuit band and corroboration still runs.
//!
//! The engine never fails a call: every detectable condition becomes an
//! error or warning inside the returned verdict.

pub mod calendar;
pub mod placeholder;

use crate::types::{Claim, ClaimValue, Layer, LayerVerdict};
use chrono::{Datelike, Months, NaiveDate, Utc};
use civet_common::config::RuleSettings;
use tracing::debug;

/// Confidence of a verdict with no findings at all
const CLEAN_PASS_CONFIDENCE: u8 = 95;
/// Deduction for a violated weekday constraint (20 when it is the only
/// finding, matching the documented Louisiana rejection)
const WEEKDAY_VIOLATION_DEDUCTION: u32 = 75;
/// Deduction for a date outside the plausibility window
const IMPLAUSIBLE_DATE_DEDUCTION: u32 = 55;
/// Deduction for placeholder or empty text content
const PLACEHOLDER_DEDUCTION: u32 = 60;
/// Deduction per warning
const WARNING_DEDUCTION: u32 = 10;

/// Layer 1 deterministic rule engine
pub struct RuleEngine {
    plausibility_window_years: u32,
}

impl RuleEngine {
    pub fn new(settings: &RuleSettings) -> Self {
        Self {
            plausibility_window_years: settings.plausibility_window_years.max(1) as u32,
        }
    }

    /// Validate a claim against today's date
    pub fn validate(&self, claim: &Claim) -> LayerVerdict {
        self.validate_at(claim, Utc::now().date_naive())
    }

    /// Validate a claim against an explicit "today" (deterministic tests)
    pub fn validate_at(&self, claim: &Claim, today: NaiveDate) -> LayerVerdict {
        let mut errors: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();
        let mut deduction: u32 = 0;

        match &claim.value {
            ClaimValue::Date(date) => {
                self.check_weekday(claim, *date, &mut errors, &mut warnings, &mut deduction);
                self.check_plausibility(*date, today, &mut errors, &mut warnings, &mut deduction);
            }
            ClaimValue::Text(text) => {
                check_text_content(claim, text, &mut errors, &mut deduction);
            }
        }

        deduction += warnings.len() as u32 * WARNING_DEDUCTION;

        let confidence = (CLEAN_PASS_CONFIDENCE as u32).saturating_sub(deduction) as u8;
        let is_valid = errors.is_empty();

        debug!(
            field = %claim.field,
            is_valid,
            confidence,
            error_count = errors.len(),
            "Rule engine verdict"
        );

        let mut verdict = LayerVerdict::new(Layer::Rules, is_valid, confidence);
        verdict.errors = errors;
        verdict.warnings = warnings;
        verdict.sources_checked = vec![Layer::Rules.canonical_source().to_string()];
        verdict
    }

    /// Jurisdiction day-of-week constraint
    fn check_weekday(
        &self,
        claim: &Claim,
        date: NaiveDate,
        errors: &mut Vec<String>,
        warnings: &mut Vec<String>,
        deduction: &mut u32,
    ) {
        match claim.jurisdiction.as_deref() {
            Some(state) => match calendar::required_weekday(state) {
                Some(required) if date.weekday() != required => {
                    errors.push(format!(
                        "election date {} falls on a {}; elections in {} must be a {}",
                        date,
                        calendar::weekday_name(date.weekday()),
                        state,
                        calendar::weekday_name(required),
                    ));
                    *deduction += WEEKDAY_VIOLATION_DEDUCTION;
                }
                Some(_) => {}
                None => {
                    warnings.push(format!(
                        "unknown jurisdiction {}; weekday rules not applied",
                        state
                    ));
                }
            },
            None => {
                warnings.push("claim has no jurisdiction; weekday rules not applied".to_string());
            }
        }
    }

    /// Claimed date must fall within the plausibility window around today
    fn check_plausibility(
        &self,
        date: NaiveDate,
        today: NaiveDate,
        errors: &mut Vec<String>,
        warnings: &mut Vec<String>,
        deduction: &mut u32,
    ) {
        let months = Months::new(self.plausibility_window_years * 12);
        let earliest = today.checked_sub_months(months).unwrap_or(NaiveDate::MIN);
        let latest = today.checked_add_months(months).unwrap_or(NaiveDate::MAX);

        if date < earliest || date > latest {
            errors.push(format!(
                "claimed date {} is more than {} years from today",
                date, self.plausibility_window_years
            ));
            *deduction += IMPLAUSIBLE_DATE_DEDUCTION;
        } else if date < today {
            warnings.push(format!("claimed election date {} is in the past", date));
        }
    }
}

/// Placeholder and empty-content checks for text fields
fn check_text_content(
    claim: &Claim,
    text: &str,
    errors: &mut Vec<String>,
    deduction: &mut u32,
) {
    if text.trim().is_empty() {
        errors.push(format!("field {} is empty", claim.field));
        *deduction += PLACEHOLDER_DEDUCTION;
        return;
    }

    if let Some(hit) = placeholder::find_placeholder(text) {
        errors.push(format!(
            "placeholder content {:?} detected in field {}",
            hit, claim.field
        ));
        *deduction += PLACEHOLDER_DEDUCTION;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityKind;
    use chrono::Weekday;
    use uuid::Uuid;

    fn engine() -> RuleEngine {
        RuleEngine::new(&RuleSettings::default())
    }

    /// Fixed reference date for deterministic tests: Tuesday 2026-08-04
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 4).unwrap()
    }

    fn date_claim(state: Option<&str>, date: NaiveDate) -> Claim {
        Claim::date(
            EntityKind::Election,
            Uuid::new_v4(),
            state,
            "election_date",
            date,
        )
    }

    #[test]
    fn louisiana_saturday_is_a_clean_pass() {
        // 2026-09-12 is a Saturday
        let date = NaiveDate::from_ymd_opt(2026, 9, 12).unwrap();
        assert_eq!(date.weekday(), Weekday::Sat);

        let verdict = engine().validate_at(&date_claim(Some("LA"), date), today());
        assert!(verdict.is_valid);
        assert_eq!(verdict.confidence, 95);
        assert!(verdict.errors.is_empty());
        assert!(verdict.warnings.is_empty());
    }

    #[test]
    fn louisiana_tuesday_is_rejected_at_confidence_20() {
        // 2026-09-15 is a Tuesday, wrong weekday for Louisiana
        let date = NaiveDate::from_ymd_opt(2026, 9, 15).unwrap();
        assert_eq!(date.weekday(), Weekday::Tue);

        let verdict = engine().validate_at(&date_claim(Some("LA"), date), today());
        assert!(!verdict.is_valid);
        assert_eq!(verdict.confidence, 20);
        assert_eq!(verdict.errors.len(), 1);
        assert!(verdict.errors[0].contains("must be a Saturday"));
    }

    #[test]
    fn georgia_tuesday_is_a_clean_pass() {
        // 2026-11-03 is a Tuesday
        let date = NaiveDate::from_ymd_opt(2026, 11, 3).unwrap();
        let verdict = engine().validate_at(&date_claim(Some("GA"), date), today());
        assert!(verdict.is_valid);
        assert_eq!(verdict.confidence, 95);
    }

    #[test]
    fn date_outside_window_is_an_error() {
        let date = NaiveDate::from_ymd_opt(2031, 11, 4).unwrap();
        let verdict = engine().validate_at(&date_claim(Some("GA"), date), today());
        assert!(!verdict.is_valid);
        assert!(verdict.errors.iter().any(|e| e.contains("2 years")));
    }

    #[test]
    fn past_date_is_a_warning_not_an_error() {
        // 2025-11-04 is a past Tuesday within the window
        let date = NaiveDate::from_ymd_opt(2025, 11, 4).unwrap();
        let verdict = engine().validate_at(&date_claim(Some("GA"), date), today());
        assert!(verdict.is_valid);
        assert_eq!(verdict.warnings.len(), 1);
        assert!(verdict.warnings[0].contains("in the past"));
        // One warning drops the verdict below the short-circuit band
        assert_eq!(verdict.confidence, 85);
    }

    #[test]
    fn unknown_jurisdiction_warns_and_drops_below_short_circuit() {
        let date = NaiveDate::from_ymd_opt(2026, 11, 3).unwrap();
        let verdict = engine().validate_at(&date_claim(Some("ZZ"), date), today());
        assert!(verdict.is_valid);
        assert_eq!(verdict.confidence, 85);
        assert!(verdict.warnings[0].contains("unknown jurisdiction"));
    }

    #[test]
    fn missing_jurisdiction_warns() {
        let date = NaiveDate::from_ymd_opt(2026, 11, 3).unwrap();
        let verdict = engine().validate_at(&date_claim(None, date), today());
        assert!(verdict.is_valid);
        assert!(verdict.warnings[0].contains("no jurisdiction"));
    }

    #[test]
    fn placeholder_text_is_rejected() {
        let claim = Claim::text(
            EntityKind::PollingPlace,
            Uuid::new_v4(),
            Some("GA"),
            "address",
            "TBD",
        );
        let verdict = engine().validate_at(&claim, today());
        assert!(!verdict.is_valid);
        assert_eq!(verdict.confidence, 35);
        assert!(verdict.errors[0].contains("placeholder content"));
    }

    #[test]
    fn empty_text_is_rejected() {
        let claim = Claim::text(
            EntityKind::PollingPlace,
            Uuid::new_v4(),
            Some("GA"),
            "address",
            "   ",
        );
        let verdict = engine().validate_at(&claim, today());
        assert!(!verdict.is_valid);
        assert!(verdict.errors[0].contains("is empty"));
    }

    #[test]
    fn clean_text_passes() {
        let claim = Claim::text(
            EntityKind::PollingPlace,
            Uuid::new_v4(),
            Some("LA"),
            "address",
            "1234 Government St, Baton Rouge, LA 70802",
        );
        let verdict = engine().validate_at(&claim, today());
        assert!(verdict.is_valid);
        assert_eq!(verdict.confidence, 95);
    }

    #[test]
    fn multiple_findings_stack_deductions() {
        // Tuesday in Louisiana AND outside the plausibility window
        let date = NaiveDate::from_ymd_opt(2031, 9, 16).unwrap();
        assert_eq!(date.weekday(), Weekday::Tue);
        let verdict = engine().validate_at(&date_claim(Some("LA"), date), today());
        assert!(!verdict.is_valid);
        assert_eq!(verdict.errors.len(), 2);
        // 95 - 75 - 55 saturates at zero
        assert_eq!(verdict.confidence, 0);
    }
}
