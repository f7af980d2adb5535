//! Gemini `generateContent` gateway with Google Search grounding

use super::error::SearchError;
use super::grounding::{ApiErrorEnvelope, GenerateContentResponse};
use super::tier::ModelTier;
use super::traits::{SearchGateway, SearchOutcome};
use crate::config::GeminiSettings;
use crate::network::{HttpClient, HttpRequest, HttpResponse};
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error};

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gateway to the Gemini REST API
pub struct GeminiGateway {
    client: HttpClient,
    settings: GeminiSettings,
}

impl GeminiGateway {
    pub fn new(client: HttpClient, settings: GeminiSettings) -> Self {
        Self { client, settings }
    }

    /// Whether an API key is configured
    pub fn has_credential(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Endpoint for a model
    pub fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.api_version.trim_matches('/'),
            model
        )
    }

    /// Request body: the query as the only user turn, search grounding enabled
    pub fn request_body(query: &str) -> serde_json::Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": query }]
            }],
            "tools": [{ "google_search": {} }]
        })
    }

    async fn call(&self, query: &str, tier: ModelTier) -> Result<SearchOutcome, SearchError> {
        let api_key = self.api_key().ok_or(SearchError::MissingCredential)?;
        let model = self.settings.model_for(tier);

        let request = HttpRequest::post_json(self.endpoint(model), Self::request_body(query))
            .header(API_KEY_HEADER, api_key);

        debug!("Sending grounded search to {} ({})", model, tier);
        let response = self.client.execute(request).await?;

        Self::parse_response(response)
    }

    /// Turn a raw HTTP response into an outcome or a classified error
    pub fn parse_response(response: HttpResponse) -> Result<SearchOutcome, SearchError> {
        if !response.is_success() {
            let envelope: ApiErrorEnvelope = response.json().unwrap_or_default();
            return Err(SearchError::from_api(
                response.status,
                envelope.error.status.as_deref(),
                envelope.error.message.as_deref(),
            ));
        }

        let body: GenerateContentResponse = response.json()?;
        debug!(
            "Answer from {} finished with {} after searching {:?}",
            body.model_version.as_deref().unwrap_or("unknown model"),
            body.finish_reason().unwrap_or("no reason"),
            body.search_queries()
        );
        Ok(SearchOutcome::new(body.answer_text(), body.sources()))
    }
}

#[async_trait]
impl SearchGateway for GeminiGateway {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model_for(&self, tier: ModelTier) -> String {
        self.settings.model_for(tier).to_string()
    }

    async fn search(&self, query: &str, tier: ModelTier) -> Result<SearchOutcome, SearchError> {
        let result = self.call(query, tier).await;
        if let Err(ref e) = result {
            error!("Deep search error ({}): {}", tier, e);
        }
        result
    }
}
