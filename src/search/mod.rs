//! Search lifecycle module
//!
//! Holds the query controller state machine and the session task that owns
//! it on behalf of the web layer.

mod controller;
mod session;
mod state;

pub use controller::{reduce, Action, QueryController, RequestToken};
pub use session::SearchSession;
pub use state::{Phase, SearchState};
