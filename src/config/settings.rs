//! Settings structures for Nexus configuration

use crate::gateway::ModelTier;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Main settings structure matching `settings.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
    pub gemini: GeminiSettings,
    pub ui: UiSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with process environment variables
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Merge overrides from an arbitrary variable lookup.
    ///
    /// `GEMINI_API_KEY` wins over the legacy `API_KEY` name.
    pub fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("NEXUS_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("NEXUS_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = lookup("NEXUS_GEMINI_BASE_URL") {
            self.gemini.base_url = val;
        }
        if let Some(val) = lookup("NEXUS_FAST_MODEL") {
            self.gemini.fast_model = val;
        }
        if let Some(val) = lookup("NEXUS_DEEP_MODEL") {
            self.gemini.deep_model = val;
        }
        if let Some(val) = lookup("NEXUS_DEFAULT_TIER") {
            match val.parse() {
                Ok(tier) => self.ui.default_tier = tier,
                Err(e) => warn!("Ignoring NEXUS_DEFAULT_TIER: {}", e),
            }
        }

        let key = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .or_else(|| lookup("API_KEY").filter(|k| !k.trim().is_empty()));
        if let Some(key) = key {
            self.gemini.api_key = Some(key);
        }
    }

    /// Whether an API credential is available
    pub fn has_credential(&self) -> bool {
        self.gemini
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Instance name displayed in UI
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            instance_name: "Nexus".to_string(),
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: crate::DEFAULT_TIMEOUT as f64,
            pool_maxsize: 4,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

impl OutgoingSettings {
    /// Request timeout clamped to the allowed range
    pub fn timeout_secs(&self) -> f64 {
        if self.request_timeout.is_finite() && self.request_timeout > 0.0 {
            self.request_timeout.min(crate::MAX_TIMEOUT as f64)
        } else {
            crate::DEFAULT_TIMEOUT as f64
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Gemini API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    /// API key; only ever read from the file or the environment
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API root, without version
    pub base_url: String,
    /// API version path segment
    pub api_version: String,
    /// Model used for the fast tier
    pub fast_model: String,
    /// Model used for the deep tier
    pub deep_model: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_version: "v1beta".to_string(),
            fast_model: "gemini-2.5-flash".to_string(),
            deep_model: "gemini-3-pro-preview".to_string(),
        }
    }
}

impl GeminiSettings {
    /// Concrete model identifier for a tier
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast_model,
            ModelTier::Deep => &self.deep_model,
        }
    }
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Suggested queries shown on the hero screen
    pub suggestions: Vec<String>,
    /// Tier selected when the server starts
    pub default_tier: ModelTier,
    /// Page refresh interval while a search is running, in seconds
    pub refresh_interval: u32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            suggestions: vec![
                "Latest breakthroughs in nuclear fusion".to_string(),
                "History of the Roman Empire's fall".to_string(),
                "Comparison of React vs Vue in 2025".to_string(),
                "How do quantum computers work?".to_string(),
            ],
            default_tier: ModelTier::Fast,
            refresh_interval: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 3000);
        assert!(!settings.has_credential());
        assert_eq!(settings.ui.suggestions.len(), 4);
    }

    #[test]
    fn test_model_mapping() {
        let gemini = GeminiSettings::default();
        assert_eq!(gemini.model_for(ModelTier::Fast), "gemini-2.5-flash");
        assert_eq!(gemini.model_for(ModelTier::Deep), "gemini-3-pro-preview");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "server:\n  port: 8080\ngemini:\n  deep_model: gemini-2.5-pro\nui:\n  default_tier: deep\n";
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.bind_address, "127.0.0.1");
        assert_eq!(settings.gemini.deep_model, "gemini-2.5-pro");
        assert_eq!(settings.gemini.fast_model, "gemini-2.5-flash");
        assert_eq!(settings.ui.default_tier, ModelTier::Deep);
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings.merge_vars(vars(&[
            ("NEXUS_PORT", "9090"),
            ("NEXUS_FAST_MODEL", "gemini-2.0-flash"),
            ("NEXUS_DEFAULT_TIER", "Pro"),
            ("API_KEY", "legacy-key"),
        ]));
        assert_eq!(settings.ui.default_tier, ModelTier::Deep);
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.gemini.fast_model, "gemini-2.0-flash");
        assert_eq!(settings.gemini.api_key.as_deref(), Some("legacy-key"));
        assert!(settings.has_credential());
    }

    #[test]
    fn test_unknown_default_tier_ignored() {
        let mut settings = Settings::default();
        settings.merge_vars(vars(&[("NEXUS_DEFAULT_TIER", "medium")]));
        assert_eq!(settings.ui.default_tier, ModelTier::Fast);
    }

    #[test]
    fn test_gemini_key_preferred_over_legacy_name() {
        let mut settings = Settings::default();
        settings.merge_vars(vars(&[("GEMINI_API_KEY", "primary"), ("API_KEY", "legacy")]));
        assert_eq!(settings.gemini.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn test_blank_key_is_not_a_credential() {
        let mut settings = Settings::default();
        settings.merge_vars(vars(&[("GEMINI_API_KEY", "   ")]));
        assert!(!settings.has_credential());
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut settings = Settings::default();
        settings.gemini.api_key = Some("secret".to_string());
        let yaml = serde_yaml::to_string(&settings).unwrap();
        assert!(!yaml.contains("secret"));
    }

    #[test]
    fn test_timeout_clamped() {
        let mut outgoing = OutgoingSettings::default();
        outgoing.request_timeout = 10_000.0;
        assert_eq!(outgoing.timeout_secs(), crate::MAX_TIMEOUT as f64);
        outgoing.request_timeout = -1.0;
        assert_eq!(outgoing.timeout_secs(), crate::DEFAULT_TIMEOUT as f64);
    }
}
