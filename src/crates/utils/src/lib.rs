//! Transport and configuration helpers for moonraker-mcp.
//!
//! This crate holds the pieces that talk to the outside world without knowing
//! anything about printers: a single-shot HTTP transport, environment-driven
//! configuration helpers, and listener configuration for the front end.
//!
//! # Modules
//!
//! ## Client (`client`)
//!
//! A [`RemoteTransport`] seam with a reqwest-backed implementation:
//!
//! ```rust,ignore
//! use utils::client::{ClientConfig, HttpClient, HttpMethod, RemoteRequest, RemoteTransport};
//! use std::time::Duration;
//!
//! let client = HttpClient::new(ClientConfig::new().with_timeout(Duration::from_secs(10)))?;
//! let reply = client
//!     .send(RemoteRequest::new(HttpMethod::Get, "http://printer.local/printer/info"))
//!     .await?;
//! println!("{} bytes", reply.body.len());
//! ```
//!
//! ## Config (`config`)
//!
//! ```rust,ignore
//! use utils::config::{get_env_or, get_env_parse_or};
//!
//! let url = get_env_or("MOONRAKER_URL", "http://192.168.1.124")?;
//! let port: u16 = get_env_parse_or("PORT", 8000)?;
//! ```
//!
//! ## Server (`server`)
//!
//! Listener settings for the HTTP front end:
//!
//! ```rust,ignore
//! use utils::server::ServerConfig;
//!
//! let config = ServerConfig::new("0.0.0.0", 8000);
//! ```
//!
//! # Features
//!
//! - `server` - Listener configuration (enabled by default)
//! - `client` - HTTP transport (enabled by default)
//! - `config` - Environment configuration helpers (enabled by default)

pub mod error;

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "config")]
pub mod config;

// Re-export commonly used types
pub use error::{Result, UtilsError};

#[cfg(feature = "server")]
pub use server::ServerConfig;

#[cfg(feature = "client")]
pub use client::{
    ClientConfig, HttpClient, HttpMethod, RemoteReply, RemoteRequest, RemoteTransport,
    TransportFailure,
};

#[cfg(feature = "config")]
pub use config::{
    build_env_key, get_env, get_env_bool_or, get_env_or, get_env_parse, get_env_parse_or, FromEnv,
    ValidateConfig,
};
