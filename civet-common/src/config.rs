//! Configuration loading for CIVET verification services
//!
//! **[CVT-CFG-010]** Engine configuration is immutable after load: per-source
//! reliability priors, the official-domain allowlist, escalation threshold,
//! per-layer timeouts, and rule engine settings. Loading happens once at
//! process start; the engine itself never re-reads configuration.
//!
//! Config file resolution follows the CIVET priority order:
//! 1. Explicit path argument (highest priority)
//! 2. `CIVET_CONFIG` environment variable
//! 3. OS config directory (e.g. `~/.config/civet/config.toml` on Linux)
//! 4. Compiled defaults (no file present)

use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Escalation threshold settings
///
/// The escalation threshold is configurable per deployment. The reconciler's
/// pass threshold (70) is fixed and intentionally not configurable here.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Reconciled confidence below this value routes the claim to manual
    /// review (0-100)
    pub confidence_threshold: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            confidence_threshold: 70,
        }
    }
}

/// Per-layer corroboration timeouts in milliseconds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// AI corroboration call budget
    pub ai_ms: u64,
    /// Official-source lookup budget
    pub official_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            ai_ms: 8_000,
            official_ms: 5_000,
        }
    }
}

impl Timeouts {
    pub fn ai(&self) -> Duration {
        Duration::from_millis(self.ai_ms)
    }

    pub fn official(&self) -> Duration {
        Duration::from_millis(self.official_ms)
    }
}

/// Static per-source reliability priors (0-100)
///
/// **[CVT-CFG-020]** A corroboration layer's confidence starts from its
/// source prior and is decayed by evidence staleness; priors are never
/// adjusted at runtime.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcePriors {
    /// AI-assisted search corroboration
    pub ai_search: u8,
    /// Official election-site lookup
    pub official_site: u8,
}

impl Default for SourcePriors {
    fn default() -> Self {
        Self {
            ai_search: 75,
            official_site: 90,
        }
    }
}

/// Rule engine settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuleSettings {
    /// Claimed dates further than this many years from today are rejected
    pub plausibility_window_years: i64,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            plausibility_window_years: 2,
        }
    }
}

/// Built-in official-domain allowlist, keyed by USPS jurisdiction code.
///
/// The `US` entry covers federal-level sources consulted when a claim has
/// no jurisdiction of its own.
static DEFAULT_OFFICIAL_DOMAINS: Lazy<BTreeMap<String, Vec<String>>> = Lazy::new(|| {
    let mut map = BTreeMap::new();
    let entries: &[(&str, &[&str])] = &[
        ("US", &["vote.gov", "eac.gov", "usa.gov"]),
        ("CA", &["sos.ca.gov"]),
        ("FL", &["dos.fl.gov", "dos.myflorida.com"]),
        ("GA", &["sos.ga.gov", "mvp.sos.ga.gov"]),
        ("LA", &["sos.la.gov", "voterportal.sos.la.gov"]),
        ("NC", &["ncsbe.gov"]),
        ("TX", &["sos.texas.gov", "votetexas.gov"]),
    ];
    for (state, domains) in entries {
        map.insert(
            (*state).to_string(),
            domains.iter().map(|d| (*d).to_string()).collect(),
        );
    }
    map
});

/// Top-level verification engine configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct VerifyConfig {
    pub thresholds: Thresholds,
    pub timeouts: Timeouts,
    pub priors: SourcePriors,
    pub rules: RuleSettings,
    /// Official election-site domains per jurisdiction; merged over the
    /// built-in allowlist (a file entry replaces the built-in entry for
    /// that jurisdiction)
    pub official_domains: BTreeMap<String, Vec<String>>,
    /// AI corroboration API key as configured in the file; environment
    /// resolution happens in the engine (`civet_verify::config`)
    pub ai_api_key: Option<String>,
}

impl VerifyConfig {
    /// Load configuration following the CIVET resolution priority order.
    ///
    /// Absence of a config file is not an error: compiled defaults apply.
    /// A file that exists but fails to read or parse IS an error; a broken
    /// deployment must not silently fall back to defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match resolve_config_path(explicit_path) {
            Some(p) => p,
            None => {
                info!("No config file found; using compiled defaults");
                return Ok(Self::default().with_builtin_allowlist());
            }
        };

        debug!(path = %path.display(), "Loading config file");
        let contents = std::fs::read_to_string(&path)?;
        let config: VerifyConfig = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), "Configuration loaded");
        config.with_builtin_allowlist().validated()
    }

    /// Merge the built-in allowlist under any file-provided entries
    fn with_builtin_allowlist(mut self) -> Self {
        for (state, domains) in DEFAULT_OFFICIAL_DOMAINS.iter() {
            self.official_domains
                .entry(state.clone())
                .or_insert_with(|| domains.clone());
        }
        self
    }

    /// Reject out-of-range values at load time rather than at first use
    fn validated(self) -> Result<Self> {
        if self.thresholds.confidence_threshold > 100 {
            return Err(Error::Config(format!(
                "confidence_threshold must be 0-100, got {}",
                self.thresholds.confidence_threshold
            )));
        }
        if self.priors.ai_search > 100 || self.priors.official_site > 100 {
            return Err(Error::Config(
                "source priors must be 0-100".to_string(),
            ));
        }
        if self.timeouts.ai_ms == 0 || self.timeouts.official_ms == 0 {
            return Err(Error::Config(
                "corroboration timeouts must be non-zero".to_string(),
            ));
        }
        if self.rules.plausibility_window_years < 1 {
            return Err(Error::Config(
                "plausibility_window_years must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }

    /// Allowlisted official domains for a jurisdiction, if any
    pub fn domains_for(&self, jurisdiction: &str) -> Option<&[String]> {
        self.official_domains
            .get(jurisdiction)
            .map(|v| v.as_slice())
    }
}

/// Resolve the config file path, or None when no file exists anywhere in
/// the priority chain
fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: explicit path (caller asked for this file specifically,
    // so report it even if missing)
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    // Priority 2: environment variable
    if let Ok(path) = std::env::var("CIVET_CONFIG") {
        let path = PathBuf::from(path);
        if !path.exists() {
            warn!(path = %path.display(), "CIVET_CONFIG points at a missing file");
        }
        return Some(path);
    }

    // Priority 3: OS config directory
    if let Some(dir) = dirs::config_dir() {
        let path = dir.join("civet").join("config.toml");
        if path.exists() {
            return Some(path);
        }
    }

    None
}
