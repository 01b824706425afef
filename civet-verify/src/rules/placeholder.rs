//! Placeholder/test-content detection for free-text fields
//!
//! The deny-list is fixed: entries here are content that never belongs in
//! published election data, whatever the jurisdiction.

/// Multi-word phrases matched as substrings
const DENY_PHRASES: &[&str] = &["lorem ipsum", "to be determined", "do not publish"];

/// Single tokens matched whole-word (so "test" never fires on "contest")
const DENY_WORDS: &[&str] = &[
    "test", "tbd", "placeholder", "sample", "asdf", "todo", "dummy", "fixme",
    "xxx", "n/a",
];

/// Returns the deny-list entry found in `text`, if any
pub fn find_placeholder(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();

    for phrase in DENY_PHRASES {
        if lower.contains(phrase) {
            return Some(phrase);
        }
    }

    for token in lower
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '/'))
    {
        for word in DENY_WORDS {
            if token == *word {
                return Some(word);
            }
        }
    }

    None
}
