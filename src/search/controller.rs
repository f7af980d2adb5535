//! Query controller: the search state machine
//!
//! ```text
//! IDLE --submit--> SEARCHING --success--> SUCCESS
//!                      |------failure---> FAILURE
//! SUCCESS --submit--> SEARCHING
//! FAILURE --submit / retry--> SEARCHING
//! any --reset--> IDLE
//! ```
//!
//! Each accepted submission is tagged with a [`RequestToken`]. A response is
//! applied only while its token is still the one in flight; a later submit
//! or a reset makes it stale.

use super::state::{Phase, SearchState};
use crate::gateway::{SearchError, SearchOutcome};
use serde::Serialize;

/// Generation number identifying one accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// State transitions
#[derive(Debug, Clone)]
pub enum Action {
    Submit { query: String },
    Succeed(SearchOutcome),
    Fail(String),
    Reset,
}

/// Apply one transition to a state
pub fn reduce(state: SearchState, action: Action) -> SearchState {
    match action {
        Action::Submit { query } => SearchState {
            query,
            is_searching: true,
            result: None,
            sources: Vec::new(),
            error: None,
            has_searched: true,
        },
        Action::Succeed(outcome) => SearchState {
            is_searching: false,
            result: Some(outcome.text),
            sources: outcome.sources,
            error: None,
            ..state
        },
        Action::Fail(message) => SearchState {
            is_searching: false,
            result: None,
            sources: Vec::new(),
            error: Some(message),
            ..state
        },
        Action::Reset => SearchState::default(),
    }
}

/// Owner of the single [`SearchState`]
#[derive(Debug, Default)]
pub struct QueryController {
    state: SearchState,
    generation: u64,
    in_flight: Option<RequestToken>,
}

impl QueryController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Token of the request whose response would currently be applied
    pub fn in_flight(&self) -> Option<RequestToken> {
        self.in_flight
    }

    fn apply(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    /// Start a search. Blank queries are ignored and return `None`.
    ///
    /// Any request already in flight becomes stale.
    pub fn submit(&mut self, query: &str) -> Option<RequestToken> {
        if query.trim().is_empty() {
            return None;
        }

        self.generation += 1;
        let token = RequestToken(self.generation);
        self.in_flight = Some(token);
        self.apply(Action::Submit {
            query: query.to_string(),
        });
        Some(token)
    }

    /// Re-submit the preserved query after a failure.
    ///
    /// Returns the new token and the query to send; `None` outside FAILURE.
    pub fn retry(&mut self) -> Option<(RequestToken, String)> {
        if self.phase() != Phase::Failure {
            return None;
        }
        let query = self.state.query.clone();
        self.submit(&query).map(|token| (token, query))
    }

    /// Apply a gateway result if `token` is still current.
    ///
    /// Returns `false` when the result was stale and discarded.
    pub fn resolve(
        &mut self,
        token: RequestToken,
        result: Result<SearchOutcome, SearchError>,
    ) -> bool {
        if self.in_flight != Some(token) {
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(outcome) => self.apply(Action::Succeed(outcome)),
            Err(e) => self.apply(Action::Fail(e.user_message())),
        }
        true
    }

    /// Return to IDLE; any request in flight becomes stale
    pub fn reset(&mut self) {
        self.generation += 1;
        self.in_flight = None;
        self.apply(Action::Reset);
    }
}
