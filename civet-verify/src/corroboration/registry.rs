//! Source Registry
//!
//! **[CVT-COR-050]** Corroboration clients are injected once at
//! orchestrator construction and selected by layer at run time. No
//! dynamic loading: tests register fakes and run with no network.

use super::{AiSearchClient, OfficialSourceClient};
use crate::types::{CorroborationSource, Layer};
use civet_common::VerifyConfig;
use std::sync::Arc;
use tracing::warn;

/// Ordered collection of injected corroboration sources
#[derive(Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn CorroborationSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the two shipped clients, wired from configuration
    pub fn from_config(config: &VerifyConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(AiSearchClient::from_config(config)));
        match OfficialSourceClient::from_config(config) {
            Ok(client) => registry.register(Arc::new(client)),
            Err(err) => {
                warn!(error = %err, "Official source client unavailable; layer disabled")
            }
        }
        registry
    }

    /// Register a source. The first source registered for a layer wins.
    pub fn register(&mut self, source: Arc<dyn CorroborationSource>) {
        self.sources.push(source);
    }

    /// Source registered for a layer, if any
    pub fn get(&self, layer: Layer) -> Option<Arc<dyn CorroborationSource>> {
        self.sources
            .iter()
            .find(|s| s.layer() == layer)
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
