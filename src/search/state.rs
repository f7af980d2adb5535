//! Search lifecycle state

use crate::results::Source;
use serde::Serialize;

/// Lifecycle phase, derived from [`SearchState`] fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Searching,
    Success,
    Failure,
}

/// State of one screen session.
///
/// At most one of `is_searching`, `result` and `error` is active, and
/// `sources` is empty whenever `result` is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    /// Last submitted text
    pub query: String,
    pub is_searching: bool,
    /// Answer text on success
    pub result: Option<String>,
    /// Cited sources on success, unique by URI
    pub sources: Vec<Source>,
    /// Failure message
    pub error: Option<String>,
    /// Set by the first submission, cleared only by reset
    pub has_searched: bool,
}

impl SearchState {
    pub fn phase(&self) -> Phase {
        if self.is_searching {
            Phase::Searching
        } else if self.error.is_some() {
            Phase::Failure
        } else if self.result.is_some() {
            Phase::Success
        } else {
            Phase::Idle
        }
    }

    /// Whether the invariants above hold
    pub fn is_consistent(&self) -> bool {
        let active = [self.is_searching, self.result.is_some(), self.error.is_some()]
            .iter()
            .filter(|a| **a)
            .count();
        let sources_ok = self.result.is_some() || self.sources.is_empty();
        let query_ok = !self.has_searched || !self.query.trim().is_empty();
        active <= 1 && sources_ok && query_ok
    }
}
