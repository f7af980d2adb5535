//! Search gateway module
//!
//! Wraps the single outbound call to the grounded model service and
//! normalizes its answer, citations and failures.

mod error;
mod gemini;
pub mod grounding;
mod tier;
mod traits;

pub use error::{SearchError, GENERIC_FAILURE};
pub use gemini::GeminiGateway;
pub use grounding::{collect_sources, NO_RESULTS};
pub use tier::ModelTier;
pub use traits::{SearchGateway, SearchOutcome};
