//! Google Gemini client implementation.
//!
//! Sends one user turn made of a text prompt and an inline image to the
//! `generateContent` endpoint and returns the concatenated text of the first
//! candidate.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::remote::GeminiClient;
//! use llm::config::RemoteLlmConfig;
//! use llm::{ImageInput, VisionModel};
//!
//! let config = RemoteLlmConfig::new(
//!     api_key,
//!     "https://generativelanguage.googleapis.com/v1beta",
//!     "gemini-1.5-flash",
//! );
//! let client = GeminiClient::new(config)?;
//! let answer = client
//!     .describe_image("Describe the print", &ImageInput::new("image/jpeg", data))
//!     .await?;
//! ```

use crate::config::RemoteLlmConfig;
use crate::error::{LlmError, Result};
use crate::{ImageInput, VisionModel};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Google Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    config: RemoteLlmConfig,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client with the given configuration.
    pub fn new(config: RemoteLlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Endpoint URL: base_url/models/{model}:generateContent
    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    fn build_request(prompt: &str, image: &ImageInput) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![
                    GeminiPart::Text {
                        text: prompt.to_string(),
                    },
                    GeminiPart::InlineData {
                        inline_data: GeminiBlob {
                            mime_type: image.mime_type.clone(),
                            data: image.data.clone(),
                        },
                    },
                ],
            }],
        }
    }

    /// Pull the answer text out of a Gemini response.
    fn extract_text(response: GeminiResponse) -> Result<String> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("prompt blocked: {}", r))
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(LlmError::InvalidResponse(reason));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            let reason = candidate
                .finish_reason
                .map(|r| format!("empty answer (finish reason: {})", r))
                .unwrap_or_else(|| "empty answer".to_string());
            return Err(LlmError::InvalidResponse(reason));
        }

        Ok(text)
    }
}

#[async_trait]
impl VisionModel for GeminiClient {
    async fn describe_image(&self, prompt: &str, image: &ImageInput) -> Result<String> {
        let body = Self::build_request(prompt, image);

        debug!(model = %self.config.model, mime_type = %image.mime_type, "Calling Gemini generateContent");

        // Gemini uses API key as query parameter; errors must not echo the URL
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", &self.config.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::HttpError(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status("Gemini", status, error_text));
        }

        let gemini_resp: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.without_url().to_string()))?;

        Self::extract_text(gemini_resp)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// Gemini API types
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiBlob,
    },
}

#[derive(Debug, Serialize)]
struct GeminiBlob {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn test_config(base_url: &str) -> RemoteLlmConfig {
        RemoteLlmConfig::new("test-key", base_url, "gemini-1.5-flash")
    }

    async fn spawn_gemini(status: StatusCode, reply: Value) -> String {
        let app = Router::new().route(
            "/models/:call",
            post(
                move |Query(query): Query<HashMap<String, String>>, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        // Only answer when the key and image made it through.
                        let has_key = query.get("key").map(String::as_str) == Some("test-key");
                        let has_image = body["contents"][0]["parts"][1]["inlineData"]["data"]
                            .as_str()
                            .is_some();
                        if has_key && has_image {
                            (status, Json(reply))
                        } else {
                            (StatusCode::BAD_REQUEST, Json(json!({"error": "bad request"})))
                        }
                    }
                },
            ),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_client_creation() {
        let client = GeminiClient::new(test_config(
            "https://generativelanguage.googleapis.com/v1beta",
        ))
        .unwrap();
        assert_eq!(client.model_name(), "gemini-1.5-flash");
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let image = ImageInput::new("image/jpeg", "aGVsbG8=");
        let body = serde_json::to_value(GeminiClient::build_request("What is printing?", &image))
            .unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": "What is printing?"},
                        {"inlineData": {"mimeType": "image/jpeg", "data": "aGVsbG8="}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "A benchy "}, {"text": "at 40%."}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        assert_eq!(GeminiClient::extract_text(response).unwrap(), "A benchy at 40%.");
    }

    #[test]
    fn test_extract_text_reports_block_reason() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();

        let err = GeminiClient::extract_text(response).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(ref m) if m.contains("SAFETY")));
    }

    #[test]
    fn test_extract_text_rejects_empty_answer() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "MAX_TOKENS"}]
        }))
        .unwrap();

        let err = GeminiClient::extract_text(response).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(ref m) if m.contains("MAX_TOKENS")));
    }

    #[tokio::test]
    async fn test_describe_image_round_trip() {
        let base = spawn_gemini(
            StatusCode::OK,
            json!({"candidates": [{"content": {"parts": [{"text": "Spaghetti detected"}]}}]}),
        )
        .await;
        let client = GeminiClient::new(test_config(&base)).unwrap();

        let text = client
            .describe_image("Any failures?", &ImageInput::new("image/png", "AAEC"))
            .await
            .unwrap();

        assert_eq!(text, "Spaghetti detected");
    }

    #[tokio::test]
    async fn test_describe_image_rate_limited() {
        let base = spawn_gemini(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"message": "quota exhausted"}}),
        )
        .await;
        let client = GeminiClient::new(test_config(&base)).unwrap();

        let err = client
            .describe_image("Any failures?", &ImageInput::new("image/png", "AAEC"))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::RateLimitExceeded(ref body) if body.contains("quota")));
    }
}
