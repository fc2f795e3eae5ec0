//! MCP tool server for Moonraker-controlled 3D printers
//!
//! Printer-control intents arrive as tool calls, are matched against a static
//! [`ActionCatalog`], sent to Moonraker over HTTP, and the `{"result": ...}`
//! replies are reshaped into stable records. Webcam snapshots can be analyzed
//! by a Gemini vision model.
//!
//! # Example
//!
//! ```rust,ignore
//! use moonraker_mcp::{ActionDispatcher, VisionAnalysisAdapter, ToolRegistry};
//! use std::sync::Arc;
//! use utils::{ClientConfig, HttpClient};
//!
//! let transport = Arc::new(HttpClient::new(ClientConfig::new())?);
//! let dispatcher = ActionDispatcher::new(transport.clone(), "http://192.168.1.124");
//! let vision = VisionAnalysisAdapter::new(transport, "http://192.168.1.124");
//! let registry = ToolRegistry::new(dispatcher, vision);
//!
//! let result = registry.call("get_printer_state", &serde_json::json!({})).await;
//! println!("{}", result.to_value());
//! ```

pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod server;
pub mod tools;
pub mod vision;

pub use catalog::{ActionCatalog, ActionSpec};
pub use config::McpConfig;
pub use dispatcher::ActionDispatcher;
pub use envelope::{Envelope, EnvelopeFailure};
pub use error::{DispatchError, ErrorKind};
pub use tools::ToolRegistry;
pub use vision::VisionAnalysisAdapter;

use llm::remote::GeminiClient;
use std::sync::Arc;
use utils::HttpClient;

/// Errors while wiring the server from configuration
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] utils::UtilsError),

    #[error(transparent)]
    Vision(#[from] llm::LlmError),
}

/// Build the tool registry described by `config`
pub fn build_registry(config: &McpConfig) -> Result<ToolRegistry, SetupError> {
    let transport = Arc::new(HttpClient::new(config.client_config())?);

    let dispatcher = ActionDispatcher::new(transport.clone(), config.moonraker_url.as_str())
        .with_raw_result(config.include_raw_result);

    let mut vision = VisionAnalysisAdapter::new(transport, &config.moonraker_url);
    if let Some(gemini) = &config.gemini {
        vision = vision.with_model(Arc::new(GeminiClient::new(gemini.clone())?));
    }

    Ok(ToolRegistry::new(dispatcher, vision))
}
