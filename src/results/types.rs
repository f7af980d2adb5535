//! Result type definitions

use serde::{Deserialize, Serialize};
use url::Url;

/// A web page the model cited for its answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Display title
    pub title: String,
    /// Absolute URL
    pub uri: String,
}

impl Source {
    /// Create a new source
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
        }
    }

    /// Host name for display, without a leading `www.`; `web` if the URI does not parse
    pub fn domain(&self) -> String {
        Url::parse(&self.uri)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "web".to_string())
    }

    /// Whether the URI is an http(s) link safe to put in an `href`
    pub fn is_web_link(&self) -> bool {
        Url::parse(&self.uri)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false)
    }
}

/// A source prepared for rendering as a numbered card
#[derive(Debug, Clone, Serialize)]
pub struct SourceCard {
    /// 1-based position
    pub index: usize,
    pub title: String,
    /// Link target; `None` for anything but http(s)
    pub uri: Option<String>,
    pub domain: String,
}

impl SourceCard {
    /// Number a list of sources for display
    pub fn from_sources(sources: &[Source]) -> Vec<SourceCard> {
        sources
            .iter()
            .enumerate()
            .map(|(i, s)| SourceCard {
                index: i + 1,
                title: s.title.clone(),
                uri: s.is_web_link().then(|| s.uri.clone()),
                domain: s.domain(),
            })
            .collect()
    }
}
