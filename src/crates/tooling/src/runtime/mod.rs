//! Runtime types for tool execution
//!
//! A tool invocation always ends in a [`ToolResult`]: either a success record
//! (a JSON object whose shape belongs to the tool) or a uniform failure
//! record `{"error": ..., "raw_response": ...}`. Failures also carry a
//! machine-readable code that stays in-process for logging.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of a single tool invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResult {
    /// Tool-specific success record
    Success(Map<String, Value>),

    /// Uniform failure record
    Failure(ToolFailure),
}

/// Failure record returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolFailure {
    /// Human-readable error message
    pub error: String,

    /// Original remote body, when one was received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<Value>,

    /// Error code, never serialized
    #[serde(skip)]
    pub code: &'static str,
}

impl ToolResult {
    /// Create a success result
    ///
    /// Objects are used as-is; any other value is wrapped as `{"result": value}`.
    pub fn success(value: Value) -> Self {
        match value {
            Value::Object(map) => ToolResult::Success(map),
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                ToolResult::Success(map)
            }
        }
    }

    /// Create a failure result
    pub fn failure(code: &'static str, error: impl Into<String>) -> Self {
        ToolResult::Failure(ToolFailure {
            error: error.into(),
            raw_response: None,
            code,
        })
    }

    /// Attach the original remote body to a failure
    ///
    /// Success results are returned unchanged.
    pub fn with_raw_response(self, raw: Value) -> Self {
        match self {
            ToolResult::Failure(mut failure) => {
                failure.raw_response = Some(raw);
                ToolResult::Failure(failure)
            }
            success => success,
        }
    }

    /// Whether this result is a failure record
    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Failure(_))
    }

    /// Error message of a failure
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ToolResult::Failure(failure) => Some(&failure.error),
            ToolResult::Success(_) => None,
        }
    }

    /// Error code of a failure
    pub fn code(&self) -> Option<&'static str> {
        match self {
            ToolResult::Failure(failure) => Some(failure.code),
            ToolResult::Success(_) => None,
        }
    }

    /// Raw remote body attached to a failure
    pub fn raw_response(&self) -> Option<&Value> {
        match self {
            ToolResult::Failure(failure) => failure.raw_response.as_ref(),
            ToolResult::Success(_) => None,
        }
    }

    /// Field of a success record
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            ToolResult::Success(map) => map.get(key),
            ToolResult::Failure(_) => None,
        }
    }

    /// Add a field to a success record; failures are left untouched
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        if let ToolResult::Success(map) = self {
            map.insert(key.into(), value);
        }
    }

    /// The record as it is handed to callers
    pub fn to_value(&self) -> Value {
        match self {
            ToolResult::Success(map) => Value::Object(map.clone()),
            ToolResult::Failure(failure) => {
                let mut map = Map::new();
                map.insert("error".to_string(), Value::String(failure.error.clone()));
                if let Some(raw) = &failure.raw_response {
                    map.insert("raw_response".to_string(), raw.clone());
                }
                Value::Object(map)
            }
        }
    }
}

/// Description of a tool as published to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON schema of the tool arguments
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}
