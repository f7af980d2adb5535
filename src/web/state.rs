//! Application state shared across handlers

use crate::config::Settings;
use crate::gateway::{ModelTier, SearchGateway};
use crate::metrics::Metrics;
use crate::search::SearchSession;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide fast/deep toggle.
///
/// Read once per submission; the value is passed into the session so a
/// later toggle never affects a search already running.
#[derive(Debug, Default)]
pub struct ModelSelection {
    use_deep: AtomicBool,
}

impl ModelSelection {
    pub fn new(tier: ModelTier) -> Self {
        Self {
            use_deep: AtomicBool::new(tier.is_deep()),
        }
    }

    pub fn tier(&self) -> ModelTier {
        ModelTier::from_pro_flag(self.use_deep.load(Ordering::Relaxed))
    }

    /// Flip the tier and return the new value
    pub fn toggle(&self) -> ModelTier {
        let was_deep = self.use_deep.fetch_xor(true, Ordering::Relaxed);
        ModelTier::from_pro_flag(!was_deep)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// The single search session
    pub session: SearchSession,
    /// Current model tier toggle
    pub selection: Arc<ModelSelection>,
    /// Search metrics
    pub metrics: Arc<Metrics>,
    /// Template renderer
    pub templates: Arc<super::Templates>,
}

impl AppState {
    /// Create new application state; spawns the search session
    pub fn new(
        settings: Settings,
        gateway: Arc<dyn SearchGateway>,
        metrics: Arc<Metrics>,
    ) -> anyhow::Result<Self> {
        let templates = Arc::new(super::Templates::new()?);
        let selection = Arc::new(ModelSelection::new(settings.ui.default_tier));
        let session = SearchSession::spawn(gateway, metrics.clone());

        Ok(Self {
            settings: Arc::new(settings),
            session,
            selection,
            metrics,
            templates,
        })
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }

    /// Whether an API key was configured at startup
    pub fn has_credential(&self) -> bool {
        self.settings.has_credential()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_toggle() {
        let selection = ModelSelection::new(ModelTier::Fast);
        assert_eq!(selection.tier(), ModelTier::Fast);
        assert_eq!(selection.toggle(), ModelTier::Deep);
        assert_eq!(selection.tier(), ModelTier::Deep);
        assert_eq!(selection.toggle(), ModelTier::Fast);
        assert_eq!(ModelSelection::new(ModelTier::Deep).tier(), ModelTier::Deep);
    }
}
