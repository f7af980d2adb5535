//! HTTP networking module
//!
//! Provides the outgoing HTTP client used to reach the model service.

mod client;
mod request;

pub use client::HttpClient;
pub use request::{HttpRequest, HttpResponse};
