//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `VASTRAVERSE_API_URL` - Backend REST base URL (default: `http://localhost:5000/api`)
//! - `VASTRAVERSE_API_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `VASTRAVERSE_SESSION_FILE` - Where the session token is persisted
//!   (default: `.vastraverse/session.json`)
//! - `VASTRAVERSE_CATALOG_CACHE_TTL_SECS` - Product cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_TIMEOUT_SECS: &str = "10";
const DEFAULT_SESSION_FILE: &str = ".vastraverse/session.json";
const DEFAULT_CATALOG_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Path of the persisted session file
    pub session_file: PathBuf,
    /// How long catalog responses stay cached
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Backend REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL all resource paths are joined onto
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// API configuration pointing at `base_url` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("VASTRAVERSE_API_URL", base_url)?,
            timeout: DEFAULT_TIMEOUT,
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a map instead of mutating the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let base_url = parse_base_url(
            "VASTRAVERSE_API_URL",
            &get_or("VASTRAVERSE_API_URL", DEFAULT_API_URL),
        )?;
        let timeout = parse_secs(
            "VASTRAVERSE_API_TIMEOUT_SECS",
            &get_or("VASTRAVERSE_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
        )?;
        let catalog_cache_ttl = parse_secs(
            "VASTRAVERSE_CATALOG_CACHE_TTL_SECS",
            &get_or("VASTRAVERSE_CATALOG_CACHE_TTL_SECS", DEFAULT_CATALOG_TTL_SECS),
        )?;
        let session_file = PathBuf::from(get_or("VASTRAVERSE_SESSION_FILE", DEFAULT_SESSION_FILE));

        Ok(Self {
            api: ApiConfig { base_url, timeout },
            session_file,
            catalog_cache_ttl,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL, ensuring it can have path segments appended.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            "must be an absolute URL".to_owned(),
        ));
    }

    Ok(url)
}

/// Parse a positive number of seconds.
fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            "must be greater than zero".to_owned(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:5000/api");
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(
            config.session_file,
            PathBuf::from(".vastraverse/session.json")
        );
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("VASTRAVERSE_API_URL", "https://api.vastraverse.in/v1"),
            ("VASTRAVERSE_API_TIMEOUT_SECS", "30"),
            ("VASTRAVERSE_SESSION_FILE", "/tmp/vv.json"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ])
        .unwrap();
        assert_eq!(config.api.base_url.host_str(), Some("api.vastraverse.in"));
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert_eq!(config.session_file, PathBuf::from("/tmp/vv.json"));
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_empty_sentry_dsn_is_none() {
        let config = load(&[("SENTRY_DSN", "")]).unwrap();
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_url() {
        let err = load(&[("VASTRAVERSE_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "VASTRAVERSE_API_URL"));

        let err = load(&[("VASTRAVERSE_API_URL", "ftp://files.example/api")]).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(load(&[("VASTRAVERSE_API_TIMEOUT_SECS", "ten")]).is_err());
        assert!(load(&[("VASTRAVERSE_API_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_api_config_with_base_url() {
        let api = ApiConfig::with_base_url("http://127.0.0.1:4000/api").unwrap();
        assert_eq!(api.base_url.port(), Some(4000));
        assert_eq!(api.timeout, Duration::from_secs(10));
        assert!(ApiConfig::with_base_url("mailto:a@b.c").is_err());
    }
}
