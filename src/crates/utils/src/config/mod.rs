//! Configuration management utilities.
//!
//! Configuration comes from environment variables. The helpers here
//! distinguish "not set" from "set but invalid": a missing variable falls
//! back to a default, a malformed one is an error.
//!
//! # Example
//!
//! ```rust,ignore
//! use utils::config::{build_env_key, get_env_or, get_env_parse_or, FromEnv, ValidateConfig};
//!
//! struct AppConfig {
//!     url: String,
//!     port: u16,
//! }
//!
//! impl FromEnv for AppConfig {
//!     fn from_env(prefix: &str) -> utils::Result<Self> {
//!         Ok(Self {
//!             url: get_env_or(&build_env_key(prefix, "url"), "http://localhost")?,
//!             port: get_env_parse_or(&build_env_key(prefix, "port"), 8000)?,
//!         })
//!     }
//! }
//! ```

use crate::error::{Result, UtilsError};
use std::env;
use std::str::FromStr;

/// Get an environment variable.
///
/// Returns `Ok(None)` when unset and an error when the value is not valid
/// unicode.
pub fn get_env(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err @ env::VarError::NotUnicode(_)) => Err(UtilsError::EnvError(err)),
    }
}

/// Get an environment variable, treating empty or whitespace-only values as unset.
pub fn get_env_non_empty(key: &str) -> Result<Option<String>> {
    Ok(get_env(key)?
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

/// Get an environment variable and parse it to the specified type.
pub fn get_env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_non_empty(key)? {
        Some(value) => value.parse::<T>().map(Some).map_err(|e| {
            UtilsError::ConfigError(format!(
                "Failed to parse environment variable '{}': {}",
                key, e
            ))
        }),
        None => Ok(None),
    }
}

/// Get an environment variable with a default value.
pub fn get_env_or(key: &str, default: impl Into<String>) -> Result<String> {
    Ok(get_env_non_empty(key)?.unwrap_or_else(|| default.into()))
}

/// Get an environment variable and parse it, or use a default value when unset.
pub fn get_env_parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(get_env_parse(key)?.unwrap_or(default))
}

/// Get a boolean environment variable with a default.
///
/// Recognizes `true/1/yes/on` and `false/0/no/off`, case-insensitively.
pub fn get_env_bool_or(key: &str, default: bool) -> Result<bool> {
    match get_env_non_empty(key)? {
        Some(value) => match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(UtilsError::ConfigError(format!(
                "Invalid boolean value for '{}': {}",
                key, value
            ))),
        },
        None => Ok(default),
    }
}

/// Build a prefixed environment variable name.
///
/// ```rust,ignore
/// assert_eq!(build_env_key("APP_", "port"), "APP_PORT");
/// ```
pub fn build_env_key(prefix: &str, name: &str) -> String {
    format!("{}{}", prefix, name.to_uppercase())
}

/// Trait for types that can be loaded from environment variables.
pub trait FromEnv: Sized {
    /// Load configuration from environment variables with the given prefix.
    fn from_env(prefix: &str) -> Result<Self>;
}

/// Trait for validating configuration.
pub trait ValidateConfig {
    /// Validate the configuration, returning an error if invalid.
    fn validate(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable names so they can run in parallel.

    #[test]
    fn test_get_env_missing() {
        assert_eq!(get_env("UTILS_TEST_MISSING_VAR_12345").unwrap(), None);
    }

    #[test]
    fn test_get_env_or_default() {
        let value = get_env_or("UTILS_TEST_MISSING_VAR_12345", "fallback").unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn test_blank_value_counts_as_unset() {
        env::set_var("UTILS_TEST_BLANK", "   ");
        assert_eq!(get_env_non_empty("UTILS_TEST_BLANK").unwrap(), None);
        assert_eq!(get_env_or("UTILS_TEST_BLANK", "fallback").unwrap(), "fallback");
        env::remove_var("UTILS_TEST_BLANK");
    }

    #[test]
    fn test_get_env_parse() {
        env::set_var("UTILS_TEST_NUMBER", "42");
        let value: Option<u16> = get_env_parse("UTILS_TEST_NUMBER").unwrap();
        assert_eq!(value, Some(42));
        env::remove_var("UTILS_TEST_NUMBER");
    }

    #[test]
    fn test_get_env_parse_invalid() {
        env::set_var("UTILS_TEST_INVALID_NUMBER", "eighty");
        let result: Result<Option<u16>> = get_env_parse("UTILS_TEST_INVALID_NUMBER");
        assert!(matches!(result, Err(UtilsError::ConfigError(_))));
        env::remove_var("UTILS_TEST_INVALID_NUMBER");
    }

    #[test]
    fn test_get_env_parse_or() {
        let value: u64 = get_env_parse_or("UTILS_TEST_MISSING_VAR_12345", 10).unwrap();
        assert_eq!(value, 10);

        env::set_var("UTILS_TEST_PARSE_OR", "30");
        let value: u64 = get_env_parse_or("UTILS_TEST_PARSE_OR", 10).unwrap();
        assert_eq!(value, 30);
        env::remove_var("UTILS_TEST_PARSE_OR");
    }

    #[test]
    fn test_get_env_bool_or() {
        let cases = [
            ("true", true),
            ("YES", true),
            ("1", true),
            ("on", true),
            ("false", false),
            ("No", false),
            ("0", false),
            ("off", false),
        ];

        for (value, expected) in cases {
            env::set_var("UTILS_TEST_BOOL", value);
            assert_eq!(
                get_env_bool_or("UTILS_TEST_BOOL", !expected).unwrap(),
                expected,
                "Failed for value: {}",
                value
            );
        }
        env::remove_var("UTILS_TEST_BOOL");

        assert!(get_env_bool_or("UTILS_TEST_BOOL_MISSING", true).unwrap());
    }

    #[test]
    fn test_get_env_bool_invalid() {
        env::set_var("UTILS_TEST_BOOL_INVALID", "maybe");
        assert!(get_env_bool_or("UTILS_TEST_BOOL_INVALID", false).is_err());
        env::remove_var("UTILS_TEST_BOOL_INVALID");
    }

    #[test]
    fn test_build_env_key() {
        assert_eq!(build_env_key("APP_", "port"), "APP_PORT");
        assert_eq!(build_env_key("", "moonraker_url"), "MOONRAKER_URL");
    }
}
