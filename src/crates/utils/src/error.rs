//! Error types for utility functions.

use thiserror::Error;

/// Result type for utility operations.
pub type Result<T> = std::result::Result<T, UtilsError>;

/// Errors raised while building clients or loading configuration.
///
/// Failures of an actual remote call are not represented here; those are
/// [`crate::client::TransportFailure`] values returned by the transport.
#[derive(Debug, Error)]
pub enum UtilsError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Environment variable present but not valid unicode.
    #[error("Environment variable error: {0}")]
    EnvError(#[from] std::env::VarError),

    /// Server error.
    #[error("Server error: {0}")]
    ServerError(String),

    /// Client construction error.
    #[error("Client error: {0}")]
    ClientError(String),
}
