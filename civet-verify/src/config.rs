//! Configuration resolution for civet-verify
//!
//! **[CVT-CFG-030]** Credential resolution with ENV → TOML priority. The
//! base configuration itself is loaded once by `civet_common::config`; the
//! engine only resolves secrets that may arrive through the environment
//! instead of the config file.

use civet_common::VerifyConfig;
use tracing::{info, warn};

const AI_API_KEY_ENV: &str = "CIVET_AI_API_KEY";

/// Resolve the AI corroboration API key
///
/// **Priority:** ENV → TOML. None means the AI layer runs disabled.
pub fn resolve_ai_api_key(config: &VerifyConfig) -> Option<String> {
    let env_key = std::env::var(AI_API_KEY_ENV)
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = config
        .ai_api_key
        .clone()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "AI API key found in both environment and config file; using environment (highest priority)"
        );
    }

    match env_key {
        Some(key) => {
            info!("AI corroboration API key loaded from environment variable");
            Some(key)
        }
        None => toml_key.map(|key| {
            info!("AI corroboration API key loaded from config file");
            key
        }),
    }
}

/// Plausibility check on key material: long enough to be real, no
/// embedded whitespace
fn is_valid_key(key: &str) -> bool {
    let key = key.trim();
    key.len() >= 16 && !key.contains(char::is_whitespace)
}
