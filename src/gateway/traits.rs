//! Gateway trait and types

use super::error::SearchError;
use super::tier::ModelTier;
use crate::results::Source;
use async_trait::async_trait;
use serde::Serialize;

/// Normalized answer from one grounded search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    /// Answer text, never empty
    pub text: String,
    /// Cited sources, unique by URI, in citation order
    pub sources: Vec<Source>,
}

impl SearchOutcome {
    pub fn new(text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            text: text.into(),
            sources,
        }
    }
}

/// One outbound call to a grounded model service.
///
/// Implementations hold no per-search state; every failure is returned as a
/// [`SearchError`].
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Gateway name, used in logs
    fn name(&self) -> &str;

    /// Model identifier that serves a tier
    fn model_for(&self, tier: ModelTier) -> String;

    /// Run one grounded search
    async fn search(&self, query: &str, tier: ModelTier) -> Result<SearchOutcome, SearchError>;
}
