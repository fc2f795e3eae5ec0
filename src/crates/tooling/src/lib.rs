//! Tooling utilities shared by the moonraker-mcp crates
//!
//! # Modules
//!
//! - `runtime` - Tool result records and tool definitions
//! - `validation` - Fluent validation API for tool arguments
//! - `logging` - Structured logging helpers and formatters

pub mod logging;
pub mod runtime;
pub mod validation;

use thiserror::Error;

/// Errors that can occur in the tooling crate
#[derive(Debug, Error)]
pub enum ToolingError {
    /// A value failed validation; the message is caller-facing
    #[error("{0}")]
    Validation(String),
}

/// Result type for tooling operations
pub type Result<T> = std::result::Result<T, ToolingError>;
