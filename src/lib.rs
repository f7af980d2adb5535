//! Nexus Search: grounded AI search in Rust
//!
//! Forwards a natural-language query to a Gemini model with Google Search
//! grounding enabled and renders the answer together with the web sources
//! the model cited.

pub mod config;
pub mod gateway;
pub mod metrics;
pub mod network;
pub mod results;
pub mod search;
pub mod web;

pub use config::Settings;
pub use gateway::{GeminiGateway, ModelTier, SearchError, SearchGateway, SearchOutcome};
pub use results::Source;
pub use search::{Phase, QueryController, SearchSession, SearchState};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default timeout for model requests in seconds.
///
/// Grounded answers from the deep tier routinely take tens of seconds.
pub const DEFAULT_TIMEOUT: u64 = 90;

/// Maximum timeout that can be set
pub const MAX_TIMEOUT: u64 = 300;
