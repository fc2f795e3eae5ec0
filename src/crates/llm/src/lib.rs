//! Multimodal model clients for moonraker-mcp.
//!
//! The crate defines the [`VisionModel`] seam ("describe this image given
//! this prompt") and a Google Gemini implementation of it.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::remote::GeminiClient;
//! use llm::config::RemoteLlmConfig;
//! use llm::{ImageInput, VisionModel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RemoteLlmConfig::new(
//!         api_key,
//!         "https://generativelanguage.googleapis.com/v1beta",
//!         "gemini-1.5-flash",
//!     );
//!     let client = GeminiClient::new(config)?;
//!
//!     let image = ImageInput::new("image/jpeg", base64_jpeg);
//!     let text = client.describe_image("Is the print detached from the bed?", &image).await?;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;

#[cfg(feature = "remote")]
pub mod remote;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use config::RemoteLlmConfig;
pub use error::{LlmError, Result};

/// An image ready to send to a model: MIME type plus base64 payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInput {
    pub mime_type: String,
    pub data: String,
}

impl ImageInput {
    /// Create an image input from an already-encoded payload.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// A model that answers a text prompt about one image.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Ask the model about the image and return its free-text answer.
    async fn describe_image(&self, prompt: &str, image: &ImageInput) -> Result<String>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}
