//! Jurisdiction election-day calendar rules
//!
//! Louisiana holds state and local elections on Saturdays (La. R.S.
//! 18:402); everywhere else the statutory pattern for scheduled elections
//! is Tuesday. Jurisdictions outside the known list get no weekday
//! constraint at all; the rule engine records a warning instead of
//! guessing.

use chrono::Weekday;

/// USPS codes the calendar rules know about
const KNOWN_JURISDICTIONS: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI",
    "ID", "IL", "IN", "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN",
    "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH",
    "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA",
    "WV", "WI", "WY", "US",
];

pub fn is_known_jurisdiction(code: &str) -> bool {
    KNOWN_JURISDICTIONS.contains(&code)
}

/// Statutory election weekday for a jurisdiction, if known
pub fn required_weekday(code: &str) -> Option<Weekday> {
    if !is_known_jurisdiction(code) {
        return None;
    }
    match code {
        "LA" => Some(Weekday::Sat),
        _ => Some(Weekday::Tue),
    }
}

/// Full English weekday name for rule messages
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn louisiana_requires_saturday() {
        assert_eq!(required_weekday("LA"), Some(Weekday::Sat));
    }

    #[test]
    fn federal_pattern_is_tuesday() {
        assert_eq!(required_weekday("GA"), Some(Weekday::Tue));
        assert_eq!(required_weekday("US"), Some(Weekday::Tue));
    }

    #[test]
    fn unknown_jurisdiction_has_no_constraint() {
        assert_eq!(required_weekday("ZZ"), None);
        assert!(!is_known_jurisdiction("ZZ"));
    }
}
