//! HTTP request handlers

use super::state::AppState;
use crate::gateway::ModelTier;
use crate::results::SourceCard;
use crate::search::{Phase, SearchState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};

/// Form body for a search submission
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    /// Search query
    pub q: Option<String>,
}

/// JSON body for `/api/search`
#[derive(Debug, Deserialize)]
pub struct ApiSearchRequest {
    pub query: String,
    /// Tier for this search; the current toggle when absent
    pub tier: Option<ModelTier>,
    /// Wait for the search to settle before answering
    #[serde(default = "default_wait")]
    pub wait: bool,
}

fn default_wait() -> bool {
    true
}

/// State snapshot returned by the JSON API
#[derive(Debug, Serialize)]
pub struct StateResponse {
    #[serde(flatten)]
    pub state: SearchState,
    pub phase: Phase,
    /// Current fast/deep toggle
    pub tier: ModelTier,
    /// Tier of the search started by `/api/search`; absent when nothing started
    #[serde(rename = "requestTier", skip_serializing_if = "Option::is_none")]
    pub request_tier: Option<ModelTier>,
}

impl StateResponse {
    fn new(state: SearchState, tier: ModelTier) -> Self {
        Self {
            phase: state.phase(),
            state,
            tier,
            request_tier: None,
        }
    }
}

/// Everything the page template reads
#[derive(Debug, Serialize)]
struct PageView<'a> {
    instance_name: &'a str,
    version: &'static str,
    state: &'a SearchState,
    phase: Phase,
    tier: ModelTier,
    tier_label: &'static str,
    sources: Vec<SourceCard>,
    suggestions: &'a [String],
    has_credential: bool,
    refresh_interval: u32,
}

/// Page handler: hero, loader, error panel or answer depending on phase
pub async fn index(State(state): State<AppState>) -> Response {
    let snapshot = state.session.snapshot();
    let tier = state.selection.tier();

    let view = PageView {
        instance_name: state.instance_name(),
        version: crate::VERSION,
        state: &snapshot,
        phase: snapshot.phase(),
        tier,
        tier_label: tier.label(),
        sources: SourceCard::from_sources(&snapshot.sources),
        suggestions: &state.settings.ui.suggestions,
        has_credential: state.has_credential(),
        refresh_interval: state.settings.ui.refresh_interval.max(1),
    };

    match state.templates.render("index.html", &view) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

/// Search form handler
pub async fn search(State(state): State<AppState>, Form(form): Form<SearchForm>) -> Redirect {
    if let Some(query) = form.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        state.session.submit(query, state.selection.tier()).await;
    }
    Redirect::to("/")
}

/// Retry the failed query with the current tier
pub async fn retry(State(state): State<AppState>) -> Redirect {
    state.session.retry(state.selection.tier()).await;
    Redirect::to("/")
}

/// Back to the hero screen
pub async fn reset(State(state): State<AppState>) -> Redirect {
    state.session.reset().await;
    Redirect::to("/")
}

/// Flip the fast/deep toggle
pub async fn toggle_tier(State(state): State<AppState>) -> Redirect {
    let tier = state.selection.toggle();
    tracing::debug!("Model tier switched to {}", tier);
    Redirect::to("/")
}

/// Current state as JSON
pub async fn api_state(State(state): State<AppState>) -> Json<StateResponse> {
    Json(StateResponse::new(
        state.session.snapshot(),
        state.selection.tier(),
    ))
}

/// Submit a search over JSON
pub async fn api_search(
    State(state): State<AppState>,
    Json(request): Json<ApiSearchRequest>,
) -> Json<StateResponse> {
    let tier = request.tier.unwrap_or_else(|| state.selection.tier());
    let query = request.query.trim();

    let accepted = state.session.submit(query, tier).await.is_some();
    let snapshot = if accepted && request.wait {
        state.session.settled().await
    } else {
        state.session.snapshot()
    };

    let mut response = StateResponse::new(snapshot, state.selection.tier());
    response.request_tier = accepted.then_some(tier);
    Json(response)
}

/// Reset over JSON
pub async fn api_reset(State(state): State<AppState>) -> Json<StateResponse> {
    state.session.reset().await;
    Json(StateResponse::new(
        state.session.snapshot(),
        state.selection.tier(),
    ))
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "credential_configured": state.has_credential(),
        "tier": state.selection.tier(),
        "metrics": state.metrics.snapshot(),
    }))
}
