//! Model tier selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Latency-versus-reasoning tradeoff for one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Lightweight default model
    #[default]
    Fast,
    /// Higher-reasoning, slower model
    Deep,
}

impl ModelTier {
    /// Tier from the boolean "use pro model" flag
    pub fn from_pro_flag(use_pro: bool) -> Self {
        if use_pro {
            ModelTier::Deep
        } else {
            ModelTier::Fast
        }
    }

    pub fn is_deep(self) -> bool {
        self == ModelTier::Deep
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelTier::Fast => "fast",
            ModelTier::Deep => "deep",
        }
    }

    /// Label shown on the toggle button
    pub fn label(self) -> &'static str {
        match self {
            ModelTier::Fast => "Flash Model",
            ModelTier::Deep => "Pro Model",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" | "flash" => Ok(ModelTier::Fast),
            "deep" | "pro" => Ok(ModelTier::Deep),
            other => Err(format!("unknown model tier: {}", other)),
        }
    }
}
