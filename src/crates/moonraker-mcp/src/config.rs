//! Server configuration loaded from the environment
//!
//! | Variable | Default |
//! |---|---|
//! | `MOONRAKER_URL` | `http://192.168.1.124` |
//! | `MOONRAKER_API_KEY` | unset |
//! | `MOONRAKER_TIMEOUT_SECS` | `10` |
//! | `GEMINI_API_KEY` / `GOOGLE_API_KEY` | unset (vision disabled) |
//! | `GEMINI_MODEL` | `gemini-1.5-flash` |
//! | `GEMINI_BASE_URL` | `https://generativelanguage.googleapis.com/v1beta` |
//! | `MCP_AUTH_TOKEN` | unset (open access) |
//! | `MCP_INCLUDE_RAW_RESULT` | `false` |
//! | `HOST` / `PORT` / `MCP_REQUEST_TIMEOUT_SECS` | `0.0.0.0` / `8000` / `120` |

use llm::RemoteLlmConfig;
use std::fmt;
use std::time::Duration;
use utils::config::get_env_non_empty;
use utils::{
    build_env_key, get_env_bool_or, get_env_or, get_env_parse_or, ClientConfig, FromEnv,
    Result, ServerConfig, UtilsError, ValidateConfig,
};

pub const DEFAULT_MOONRAKER_URL: &str = "http://192.168.1.124";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MOONRAKER_TIMEOUT_SECS: u64 = 10;

/// Everything the server needs at startup
#[derive(Clone)]
pub struct McpConfig {
    /// Moonraker base URL, without trailing slash
    pub moonraker_url: String,
    /// Sent as `X-Api-Key` when set
    pub moonraker_api_key: Option<String>,
    pub moonraker_timeout: Duration,
    /// `None` disables `analyze_snapshot`
    pub gemini: Option<RemoteLlmConfig>,
    /// Bearer token for `/mcp`; `None` leaves the endpoint open
    pub auth_token: Option<String>,
    pub include_raw_result: bool,
    pub server: ServerConfig,
}

impl McpConfig {
    /// Defaults with a given Moonraker URL
    pub fn new(moonraker_url: impl Into<String>) -> Self {
        Self {
            moonraker_url: normalize_url(moonraker_url.into()),
            moonraker_api_key: None,
            moonraker_timeout: Duration::from_secs(DEFAULT_MOONRAKER_TIMEOUT_SECS),
            gemini: None,
            auth_token: None,
            include_raw_result: false,
            server: ServerConfig::default(),
        }
    }

    pub fn with_moonraker_url(mut self, url: impl Into<String>) -> Self {
        self.moonraker_url = normalize_url(url.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    /// HTTP client settings for Moonraker calls
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new()
            .with_timeout(self.moonraker_timeout)
            .with_user_agent(format!("moonraker-mcp/{}", env!("CARGO_PKG_VERSION")));
        if let Some(key) = &self.moonraker_api_key {
            config = config.with_header("X-Api-Key", key.clone());
        }
        config
    }
}

impl Default for McpConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MOONRAKER_URL)
    }
}

impl FromEnv for McpConfig {
    fn from_env(prefix: &str) -> Result<Self> {
        let key = |name: &str| build_env_key(prefix, name);

        let moonraker_url = get_env_or(&key("moonraker_url"), DEFAULT_MOONRAKER_URL)?;
        let timeout_secs =
            get_env_parse_or(&key("moonraker_timeout_secs"), DEFAULT_MOONRAKER_TIMEOUT_SECS)?;

        let gemini_key = match get_env_non_empty(&key("gemini_api_key"))? {
            Some(found) => Some(found),
            None => get_env_non_empty(&key("google_api_key"))?,
        };
        let gemini = match gemini_key {
            Some(api_key) => Some(RemoteLlmConfig::new(
                api_key,
                get_env_or(&key("gemini_base_url"), DEFAULT_GEMINI_BASE_URL)?,
                get_env_or(&key("gemini_model"), DEFAULT_GEMINI_MODEL)?,
            )),
            None => None,
        };

        Ok(Self {
            moonraker_url: normalize_url(moonraker_url),
            moonraker_api_key: get_env_non_empty(&key("moonraker_api_key"))?,
            moonraker_timeout: Duration::from_secs(timeout_secs),
            gemini,
            auth_token: get_env_non_empty(&key("mcp_auth_token"))?,
            include_raw_result: get_env_bool_or(&key("mcp_include_raw_result"), false)?,
            server: ServerConfig::from_env(prefix)?,
        })
    }
}

impl ValidateConfig for McpConfig {
    fn validate(&self) -> Result<()> {
        if !(self.moonraker_url.starts_with("http://") || self.moonraker_url.starts_with("https://"))
        {
            return Err(UtilsError::ConfigError(format!(
                "MOONRAKER_URL must start with http:// or https:// (got '{}')",
                self.moonraker_url
            )));
        }
        if self.moonraker_timeout.is_zero() {
            return Err(UtilsError::ConfigError(
                "MOONRAKER_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        self.server.validate()
    }
}

// Secrets never reach logs.
impl fmt::Debug for McpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McpConfig")
            .field("moonraker_url", &self.moonraker_url)
            .field("moonraker_api_key", &self.moonraker_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("moonraker_timeout", &self.moonraker_timeout)
            .field("gemini", &self.gemini)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("include_raw_result", &self.include_raw_result)
            .field("server", &self.server)
            .finish()
    }
}

fn normalize_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
