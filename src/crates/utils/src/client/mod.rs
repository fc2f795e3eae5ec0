//! HTTP transport for talking to remote JSON services.
//!
//! This module provides:
//! - Client configuration builders
//! - The [`RemoteTransport`] seam used by higher layers (mockable in tests)
//! - A reqwest-backed [`HttpClient`] that performs exactly one call per request
//! - [`TransportFailure`], which separates "could not talk to the remote" from
//!   anything the remote said
//!
//! # Example
//!
//! ```rust,ignore
//! use utils::client::{ClientConfig, HttpClient, HttpMethod, RemoteRequest, RemoteTransport};
//!
//! let client = HttpClient::new(ClientConfig::new().with_header("X-Api-Key", "secret"))?;
//! let request = RemoteRequest::new(HttpMethod::Post, "http://printer.local/printer/gcode/script")
//!     .with_json(serde_json::json!({"script": "M105"}));
//! let reply = client.send(request).await?;
//! ```

use crate::error::{Result, UtilsError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tooling::logging::truncate_for_logging;
use tracing::debug;

/// Upper bound on how much of an error body is carried in a failure.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Configuration for HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request timeout duration.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: Option<String>,

    /// Default headers to include in all requests.
    #[serde(skip)]
    pub default_headers: Vec<(String, String)>,
}

impl ClientConfig {
    /// Create a new client configuration with defaults.
    pub fn new() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: None,
            default_headers: Vec::new(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add a default header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((key.into(), value.into()));
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

/// HTTP methods used against remote services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    /// Canonical upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }

    fn as_reqwest(&self) -> Method {
        match self {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single outbound request: method, absolute URL and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<Value>,
}

impl RemoteRequest {
    /// Create a request without a body.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    /// Attach a JSON payload.
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw reply from a remote service.
///
/// Only successful (2xx) replies are handed out by [`HttpClient`]; everything
/// else becomes a [`TransportFailure::Status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RemoteReply {
    /// Create a reply with a raw body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    /// Create a JSON reply.
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string()).with_content_type("application/json")
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Why a remote call produced no usable reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    /// The remote could not be reached (DNS, refused connection, TLS).
    #[error("Failed to connect to {url}: {message}")]
    Connect { url: String, message: String },

    /// The request did not complete within the configured timeout.
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// The remote answered with a non-success status code.
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// Any other failure while sending or reading the request.
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
}

impl TransportFailure {
    /// Status code, when the failure came from the remote's answer.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportFailure::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            TransportFailure::Timeout { url }
        } else if err.is_connect() {
            TransportFailure::Connect {
                url,
                message: error_chain(&err),
            }
        } else {
            TransportFailure::Request {
                url,
                message: error_chain(&err),
            }
        }
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Something that can perform one remote request.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Send the request and wait for the complete reply.
    async fn send(&self, request: RemoteRequest) -> std::result::Result<RemoteReply, TransportFailure>;
}

/// reqwest-backed transport. Never retries.
pub struct HttpClient {
    config: ClientConfig,
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout);

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|e| UtilsError::ClientError(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl RemoteTransport for HttpClient {
    async fn send(&self, request: RemoteRequest) -> std::result::Result<RemoteReply, TransportFailure> {
        let mut req = self
            .client
            .request(request.method.as_reqwest(), &request.url);

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        if let Some(body) = &request.body {
            req = req.json(body);
        }

        debug!(method = %request.method, url = %request.url, "Sending remote request");

        let response = req
            .send()
            .await
            .map_err(|e| TransportFailure::from_reqwest(&request.url, e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportFailure::from_reqwest(&request.url, e))?;

        if !status.is_success() {
            return Err(TransportFailure::Status {
                url: request.url,
                status: status.as_u16(),
                body: truncate_for_logging(&String::from_utf8_lossy(&body), MAX_ERROR_BODY_CHARS),
            });
        }

        debug!(status = status.as_u16(), bytes = body.len(), "Remote request completed");

        Ok(RemoteReply {
            status: status.as_u16(),
            content_type,
            body: body.to_vec(),
        })
    }
}
