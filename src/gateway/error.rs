//! Normalized search failures

use thiserror::Error;

/// Message used when a failure carries no text of its own
pub const GENERIC_FAILURE: &str = "An unexpected error occurred during the search.";

/// Every way a grounded search can fail, as seen past the gateway boundary
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    /// No API key was configured at startup
    #[error("No API key configured. Set GEMINI_API_KEY (or API_KEY) and restart the server.")]
    MissingCredential,

    /// The service rejected the API key
    #[error("{message}")]
    Unauthorized { message: String },

    /// Quota or rate limit exhausted on the service side
    #[error("{message}")]
    QuotaExceeded { message: String },

    /// Any other error reported by the service
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("The search request timed out.")]
    Timeout,

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Malformed response from the model service: {0}")]
    MalformedResponse(String),

    /// The search task died before producing a result
    #[error("Search failed: {0}")]
    Internal(String),
}

impl SearchError {
    /// Human-readable message, never empty
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        }
    }

    /// Classify an error reported by the service
    pub fn from_api(status: u16, api_status: Option<&str>, message: Option<&str>) -> Self {
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Search request failed with HTTP status {}", status));

        let api_status = api_status.unwrap_or_default();
        if status == 401
            || status == 403
            || api_status == "UNAUTHENTICATED"
            || api_status == "PERMISSION_DENIED"
            || message.contains("API key not valid")
        {
            SearchError::Unauthorized { message }
        } else if status == 429 || api_status == "RESOURCE_EXHAUSTED" {
            SearchError::QuotaExceeded { message }
        } else {
            SearchError::Api { status, message }
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout
        } else if err.is_decode() {
            SearchError::MalformedResponse(err.to_string())
        } else {
            SearchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::MalformedResponse(err.to_string())
    }
}
