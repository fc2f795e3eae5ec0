//! Listener configuration for the HTTP front end.
//!
//! # Example
//!
//! ```rust,ignore
//! use utils::server::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::new("127.0.0.1", 9000).with_timeout(Duration::from_secs(60));
//! let addr = config.socket_addr()?;
//! ```

use crate::config::{build_env_key, get_env_or, get_env_parse_or, FromEnv, ValidateConfig};
use crate::error::{Result, UtilsError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for HTTP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,

    /// Port to bind to.
    pub port: u16,

    /// Upper bound on how long one front-end request may run.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl ServerConfig {
    /// Create a new server configuration.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: default_timeout(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| UtilsError::ServerError(format!("Invalid socket address: {}", e)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl FromEnv for ServerConfig {
    /// Reads `{prefix}HOST`, `{prefix}PORT` and `{prefix}MCP_REQUEST_TIMEOUT_SECS`.
    fn from_env(prefix: &str) -> Result<Self> {
        let host = get_env_or(&build_env_key(prefix, "host"), DEFAULT_HOST)?;
        let port = get_env_parse_or(&build_env_key(prefix, "port"), DEFAULT_PORT)?;
        let timeout_secs = get_env_parse_or(
            &build_env_key(prefix, "mcp_request_timeout_secs"),
            default_timeout().as_secs(),
        )?;

        Ok(Self::new(host, port).with_timeout(Duration::from_secs(timeout_secs)))
    }
}

impl ValidateConfig for ServerConfig {
    fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        if self.timeout.is_zero() {
            return Err(UtilsError::ConfigError(
                "Request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

fn default_timeout() -> Duration {
    Duration::from_secs(120)
}
