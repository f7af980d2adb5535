//! Order-preserving container for deduplicating cited sources

use super::types::Source;
use std::collections::HashSet;

/// Collects sources in arrival order, unique by URI.
///
/// The first source seen for a URI is kept; later duplicates are dropped
/// even when their titles differ.
#[derive(Debug, Clone, Default)]
pub struct SourceList {
    sources: Vec<Source>,
    seen: HashSet<String>,
}

impl SourceList {
    /// Create a new empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source unless its URI was already seen.
    ///
    /// Returns whether the source was kept.
    pub fn push(&mut self, source: Source) -> bool {
        if self.seen.contains(&source.uri) {
            return false;
        }
        self.seen.insert(source.uri.clone());
        self.sources.push(source);
        true
    }

    /// Add a citation given as optional parts; entries without both a URI
    /// and a title are skipped
    pub fn push_parts(&mut self, uri: Option<&str>, title: Option<&str>) -> bool {
        match (uri, title) {
            (Some(uri), Some(title)) if !uri.is_empty() && !title.is_empty() => {
                self.push(Source::new(title, uri))
            }
            _ => false,
        }
    }

    /// Consume the list, yielding sources in arrival order
    pub fn into_vec(self) -> Vec<Source> {
        self.sources
    }
}
