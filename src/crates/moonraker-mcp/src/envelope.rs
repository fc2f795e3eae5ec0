//! Moonraker response envelope parsing
//!
//! Every successful Moonraker reply wraps its payload as `{"result": ...}`.
//! A reply without `result` is unusable no matter what status it came with.

use serde_json::Value;
use thiserror::Error;
use utils::RemoteReply;

/// Why a reply could not be turned into an [`Envelope`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvelopeFailure {
    /// The body is not JSON
    #[error("Response is not valid JSON: {message}")]
    MalformedJson { message: String, raw: String },

    /// The body is JSON but has no `result` key
    #[error("Response is missing the 'result' field")]
    MissingResult { raw: Value },

    /// `result` lacks a key the action depends on
    #[error("Response is missing the 'result.{field}' field")]
    MissingField { field: String, raw: Value },

    /// The reply carried no bytes at all
    #[error("Response body is empty")]
    EmptyBody,
}

impl EnvelopeFailure {
    /// The body as received, for the error record's `raw_response`
    pub fn raw_response(&self) -> Option<Value> {
        match self {
            EnvelopeFailure::MalformedJson { raw, .. } => Some(Value::String(raw.clone())),
            EnvelopeFailure::MissingResult { raw } | EnvelopeFailure::MissingField { raw, .. } => {
                Some(raw.clone())
            }
            EnvelopeFailure::EmptyBody => None,
        }
    }
}

/// A validated `{"result": ...}` reply
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    body: Value,
}

impl Envelope {
    /// Parse and validate a reply body
    pub fn parse(reply: &RemoteReply) -> Result<Self, EnvelopeFailure> {
        Self::from_slice(&reply.body)
    }

    /// Parse and validate raw bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EnvelopeFailure> {
        let body: Value =
            serde_json::from_slice(bytes).map_err(|e| EnvelopeFailure::MalformedJson {
                message: e.to_string(),
                raw: String::from_utf8_lossy(bytes).into_owned(),
            })?;
        Self::from_value(body)
    }

    /// Validate an already-parsed body
    pub fn from_value(body: Value) -> Result<Self, EnvelopeFailure> {
        if body.get("result").is_none() {
            return Err(EnvelopeFailure::MissingResult { raw: body });
        }
        Ok(Self { body })
    }

    /// The payload under `result`
    pub fn result(&self) -> &Value {
        &self.body["result"]
    }

    /// The complete parsed body
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// A key of `result` that must be present
    pub fn require_field(&self, field: &str) -> Result<&Value, EnvelopeFailure> {
        self.result()
            .get(field)
            .ok_or_else(|| EnvelopeFailure::MissingField {
                field: field.to_string(),
                raw: self.body.clone(),
            })
    }

    /// A key of `result`, or `default` when absent or null
    pub fn field_or(&self, field: &str, default: Value) -> Value {
        match self.result().get(field) {
            Some(Value::Null) | None => default,
            Some(value) => value.clone(),
        }
    }
}
