//! Gemini image provider implementation.
//!
//! Generates images using Google's Gemini API: one prompt in, one
//! candidate out, with the image payload delivered inline as base64.

use super::{GeneratedImage, ImageProvider, ProviderError};
use crate::config::GeminiConfig;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini image provider.
pub struct GeminiImageProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiImageProvider {
    pub fn new(config: GeminiConfig, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Build the API URL for the given model and method.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            GEMINI_API_BASE, self.config.model, method, self.config.api_key
        )
    }
}

#[async_trait]
impl ImageProvider for GeminiImageProvider {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![ContentPart::Text {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig { candidate_count: 1 }),
        };

        let url = self.api_url("generateContent");

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("Failed to parse response: {}", e)))?;

        extract_image(api_response)
    }
}

/// Pull the first candidate's inline image out of the response envelope
/// and strip its base64 transport encoding.
fn extract_image(response: GenerateContentResponse) -> Result<GeneratedImage, ProviderError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::MalformedResponse("response has no candidates".to_string()))?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(ProviderError::ContentFiltered);
    }

    let inline = candidate
        .content
        .parts
        .into_iter()
        .find_map(|part| match part {
            ContentPart::InlineData { inline_data } => Some(inline_data),
            _ => None,
        })
        .ok_or_else(|| {
            ProviderError::MalformedResponse("candidate carries no inline image data".to_string())
        })?;

    let bytes = BASE64
        .decode(inline.data.as_bytes())
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid base64 image data: {}", e)))?;

    Ok(GeneratedImage {
        bytes,
        mime_type: inline.mime_type,
    })
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    candidate_count: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline_response(data: &str) -> GenerateContentResponse {
        serde_json::from_str(&format!(
            r#"{{
                "candidates": [{{
                    "content": {{
                        "role": "model",
                        "parts": [{{"inlineData": {{"mimeType": "image/png", "data": "{}"}}}}]
                    }},
                    "finishReason": "STOP"
                }}]
            }}"#,
            data
        ))
        .expect("parse response")
    }

    #[test]
    fn extracts_inline_image_data() {
        let encoded = BASE64.encode(b"not really a png");
        let image = extract_image(inline_response(&encoded)).unwrap();
        assert_eq!(image.bytes, b"not really a png");
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn empty_candidates_is_malformed() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(matches!(
            extract_image(response),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[test]
    fn safety_stop_is_content_filtered() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {"parts": [{"text": "blocked"}]},
                    "finishReason": "SAFETY"
                }]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            extract_image(response),
            Err(ProviderError::ContentFiltered)
        ));
    }

    #[test]
    fn invalid_base64_is_malformed() {
        let response = inline_response("!!not-base64!!");
        assert!(matches!(
            extract_image(response),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[test]
    fn text_only_candidate_is_malformed() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {"parts": [{"text": "no image here"}]},
                    "finishReason": "STOP"
                }]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            extract_image(response),
            Err(ProviderError::MalformedResponse(_))
        ));
    }
}
