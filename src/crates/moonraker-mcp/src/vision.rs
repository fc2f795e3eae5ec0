//! Webcam snapshot analysis
//!
//! Fetches the current snapshot from Moonraker, base64-encodes it and asks a
//! [`VisionModel`] about it. Failures come back in the same record shape as
//! catalog actions.

use crate::envelope::EnvelopeFailure;
use crate::error::DispatchError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use llm::{ImageInput, VisionModel};
use serde_json::json;
use std::sync::Arc;
use tooling::logging::{format_bytes, format_duration, sanitize_for_logging, LogGuard};
use tooling::runtime::ToolResult;
use tooling::validation::Validator;
use tracing::{debug, info, warn};
use utils::{HttpMethod, RemoteRequest, RemoteTransport};

/// Snapshot endpoint relative to the Moonraker base URL
pub const SNAPSHOT_PATH: &str = "/webcam/?action=snapshot";

/// MIME type assumed when the webcam does not name an image type
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Base64 (standard alphabet, padded)
pub fn encode_snapshot(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Inverse of [`encode_snapshot`]
pub fn decode_snapshot(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(encoded)
}

/// Image MIME type from a Content-Type header value
pub fn snapshot_mime_type(content_type: Option<&str>) -> String {
    content_type
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| value.starts_with("image/"))
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string())
}

/// Answers prompts about the printer's webcam
pub struct VisionAnalysisAdapter {
    transport: Arc<dyn RemoteTransport>,
    snapshot_url: String,
    model: Option<Arc<dyn VisionModel>>,
}

impl VisionAnalysisAdapter {
    /// Create an adapter without a model; every analysis fails until one is set
    pub fn new(transport: Arc<dyn RemoteTransport>, base_url: &str) -> Self {
        Self {
            transport,
            snapshot_url: format!("{}{}", base_url.trim_end_matches('/'), SNAPSHOT_PATH),
            model: None,
        }
    }

    pub fn with_model(mut self, model: Arc<dyn VisionModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    pub fn snapshot_url(&self) -> &str {
        &self.snapshot_url
    }

    /// Describe the current snapshot; never fails, failures come back as records
    pub async fn analyze(&self, prompt: &str) -> ToolResult {
        let guard = LogGuard::new("analyze_snapshot");

        match self.run(prompt).await {
            Ok(result) => {
                info!(elapsed = %format_duration(guard.elapsed()), "Snapshot analyzed");
                result
            }
            Err(err) => {
                warn!(
                    code = err.error_code(),
                    error = %sanitize_for_logging(&err.to_string()),
                    "Snapshot analysis failed"
                );
                err.into()
            }
        }
    }

    async fn run(&self, prompt: &str) -> Result<ToolResult, DispatchError> {
        let prompt = Validator::new(prompt.to_string(), "prompt")
            .not_empty()
            .validate()?;

        let model = self.model.as_ref().ok_or_else(|| {
            DispatchError::Dependency(
                "no vision model configured (set GEMINI_API_KEY)".to_string(),
            )
        })?;

        let reply = self
            .transport
            .send(RemoteRequest::new(HttpMethod::Get, self.snapshot_url.as_str()))
            .await?;

        if reply.body.is_empty() {
            return Err(EnvelopeFailure::EmptyBody.into());
        }

        let image = ImageInput::new(
            snapshot_mime_type(reply.content_type.as_deref()),
            encode_snapshot(&reply.body),
        );

        debug!(
            model = model.model_name(),
            mime_type = %image.mime_type,
            size = %format_bytes(reply.body.len()),
            "Sending snapshot to vision model"
        );

        let description = model.describe_image(&prompt, &image).await?;
        Ok(ToolResult::success(json!({ "description": description })))
    }
}
