//! Response payloads from `generateContent` and their normalization

use crate::results::{Source, SourceList};
use serde::Deserialize;

/// Answer text used when the model returns nothing
pub const NO_RESULTS: &str = "No results found.";

/// Body of a successful `generateContent` call
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub grounding_metadata: Option<GroundingMetadata>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentPart {
    pub text: Option<String>,
    /// Set on reasoning summaries, which are not part of the answer
    #[serde(default)]
    pub thought: bool,
}

/// Citations attached to a candidate
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
    #[serde(default)]
    pub web_search_queries: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebChunk {
    pub uri: Option<String>,
    pub title: Option<String>,
}

impl GroundingChunk {
    /// Convenience constructor for a web citation
    pub fn web(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            web: Some(WebChunk {
                uri: Some(uri.into()),
                title: Some(title.into()),
            }),
        }
    }
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorEnvelope {
    #[serde(default)]
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<u16>,
    pub message: Option<String>,
    pub status: Option<String>,
}

impl GenerateContentResponse {
    fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Answer text of the first candidate, or [`NO_RESULTS`] when empty
    pub fn answer_text(&self) -> String {
        let text: String = self
            .first_candidate()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            NO_RESULTS.to_string()
        } else {
            text
        }
    }

    /// Why the first candidate stopped, e.g. `STOP` or `SAFETY`
    pub fn finish_reason(&self) -> Option<&str> {
        self.first_candidate()
            .and_then(|c| c.finish_reason.as_deref())
    }

    /// Queries the model ran against Google Search
    pub fn search_queries(&self) -> &[String] {
        self.first_candidate()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| m.web_search_queries.as_slice())
            .unwrap_or_default()
    }

    /// Cited web sources of the first candidate
    pub fn sources(&self) -> Vec<Source> {
        self.first_candidate()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| collect_sources(&m.grounding_chunks))
            .unwrap_or_default()
    }
}

/// Keep web citations that carry both a URI and a title, first occurrence
/// per URI, in the order given
pub fn collect_sources(chunks: &[GroundingChunk]) -> Vec<Source> {
    let mut list = SourceList::new();
    for web in chunks.iter().filter_map(|c| c.web.as_ref()) {
        list.push_parts(web.uri.as_deref(), web.title.as_deref());
    }
    list.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_uris_keep_first() {
        let chunks = vec![
            GroundingChunk::web("https://a.com", "A"),
            GroundingChunk::web("https://a.com", "A-dup"),
            GroundingChunk::web("https://b.com", "B"),
        ];
        assert_eq!(
            collect_sources(&chunks),
            vec![
                Source::new("A", "https://a.com"),
                Source::new("B", "https://b.com"),
            ]
        );
    }

    #[test]
    fn test_chunks_without_web_or_fields_skipped() {
        let chunks = vec![
            GroundingChunk { web: None },
            GroundingChunk {
                web: Some(WebChunk {
                    uri: Some("https://no-title.com".to_string()),
                    title: None,
                }),
            },
            GroundingChunk::web("", "Empty uri"),
            GroundingChunk::web("https://ok.com", "Ok"),
        ];
        assert_eq!(collect_sources(&chunks), vec![Source::new("Ok", "https://ok.com")]);
    }

    #[test]
    fn test_parse_full_payload() {
        let payload = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "Fusion "},
                    {"text": "is progressing."}
                ]},
                "finishReason": "STOP",
                "groundingMetadata": {
                    "webSearchQueries": ["fusion news"],
                    "groundingChunks": [
                        {"web": {"uri": "https://iter.org", "title": "iter.org"}},
                        {"web": {"uri": "https://nature.com/x", "title": "nature.com"}}
                    ]
                }
            }],
            "modelVersion": "gemini-2.5-flash"
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(response.answer_text(), "Fusion is progressing.");
        assert_eq!(response.sources().len(), 2);
        assert_eq!(response.model_version.as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(response.finish_reason(), Some("STOP"));
        assert_eq!(response.search_queries(), ["fusion news".to_string()]);
    }

    #[test]
    fn test_empty_text_uses_placeholder() {
        let payload = r#"{"candidates": [{"content": {"parts": [{"text": ""}]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(response.answer_text(), NO_RESULTS);
        assert!(response.sources().is_empty());
        assert!(response.finish_reason().is_none());
        assert!(response.search_queries().is_empty());
    }

    #[test]
    fn test_no_candidates_uses_placeholder() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.answer_text(), NO_RESULTS);
    }

    #[test]
    fn test_error_envelope() {
        let payload = r#"{"error": {"code": 403, "message": "denied", "status": "PERMISSION_DENIED"}}"#;
        let envelope: ApiErrorEnvelope = serde_json::from_str(payload).unwrap();
        assert_eq!(envelope.error.code, Some(403));
        assert_eq!(envelope.error.status.as_deref(), Some("PERMISSION_DENIED"));
    }
}
