//! Failure taxonomy for tool invocations
//!
//! Every failure ends up as a [`ToolResult`] failure record; the
//! [`ErrorKind`] code stays in-process for logging.

use crate::envelope::EnvelopeFailure;
use llm::LlmError;
use serde_json::Value;
use thiserror::Error;
use tooling::runtime::ToolResult;
use tooling::ToolingError;
use utils::TransportFailure;

/// Failure classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, rejected before any network call
    Validation,
    /// The controller could not be reached or rejected the request
    Transport,
    /// The controller answered with an unusable body
    Envelope,
    /// The vision model failed or is not configured
    Dependency,
}

impl ErrorKind {
    /// Machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "E_VALIDATION",
            ErrorKind::Transport => "E_TRANSPORT",
            ErrorKind::Envelope => "E_ENVELOPE",
            ErrorKind::Dependency => "E_DEPENDENCY",
        }
    }
}

/// Errors raised while dispatching an action
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    #[error("Missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid {param} '{value}'. Must be one of: {}", .allowed.join(", "))]
    InvalidSelector {
        param: String,
        value: String,
        allowed: Vec<&'static str>,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Printer request failed: {0}")]
    Transport(#[from] TransportFailure),

    #[error("Invalid printer response: {0}")]
    Envelope(#[from] EnvelopeFailure),

    #[error("Vision analysis failed: {0}")]
    Dependency(String),
}

impl DispatchError {
    /// Failure class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::UnknownAction(_)
            | DispatchError::MissingParameter(_)
            | DispatchError::InvalidParameter(_)
            | DispatchError::InvalidSelector { .. }
            | DispatchError::InvalidRequest(_) => ErrorKind::Validation,
            DispatchError::Transport(_) => ErrorKind::Transport,
            DispatchError::Envelope(_) => ErrorKind::Envelope,
            DispatchError::Dependency(_) => ErrorKind::Dependency,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        self.kind().code()
    }

    /// Remote body worth showing the caller, if one was received
    pub fn raw_response(&self) -> Option<Value> {
        match self {
            DispatchError::Envelope(failure) => failure.raw_response(),
            DispatchError::Transport(TransportFailure::Status { body, .. }) if !body.is_empty() => {
                Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.clone())))
            }
            _ => None,
        }
    }
}

impl From<ToolingError> for DispatchError {
    fn from(err: ToolingError) -> Self {
        DispatchError::InvalidParameter(err.to_string())
    }
}

impl From<LlmError> for DispatchError {
    fn from(err: LlmError) -> Self {
        DispatchError::Dependency(err.to_string())
    }
}

impl From<DispatchError> for ToolResult {
    fn from(err: DispatchError) -> Self {
        let raw = err.raw_response();
        let result = ToolResult::failure(err.error_code(), err.to_string());
        match raw {
            Some(raw) => result.with_raw_response(raw),
            None => result,
        }
    }
}
