//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CHODOCU_API_BASE_URL` - Marketplace backend (default: `http://localhost:8080/api`)
//! - `CHODOCU_REGION_API_BASE_URL` - Region catalog (default: `https://provinces.open-api.vn/api`)
//! - `CHODOCU_HTTP_TIMEOUT_SECS` - Request timeout (default: 30)
//! - `CHODOCU_REGION_CACHE_TTL_SECS` - Region cache lifetime (default: 3600)
//! - `CHODOCU_ACCESS_TOKEN` - Bearer token of an existing session
//! - `CHODOCU_ROLE` - Role of that session (default: user)
//! - `CHODOCU_EMAIL` - Email of that session
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::time::Duration;

use chodocu_core::{AuthContext, UserRole};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_REGION_API_BASE_URL: &str = "https://provinces.open-api.vn/api";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "30";
const DEFAULT_REGION_CACHE_TTL_SECS: &str = "3600";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Marketplace backend base URL, without a trailing slash
    pub api_base_url: String,
    /// Region catalog base URL, without a trailing slash
    pub region_api_base_url: String,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
    /// How long region lists stay cached
    pub region_cache_ttl: Duration,
    /// Session supplied through the environment
    pub session: Option<SessionConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// A session handed to the client through the environment.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct SessionConfig {
    /// Bearer token issued by the login endpoint
    pub access_token: SecretString,
    /// Role issued with the token
    pub role: UserRole,
    /// Email of the principal
    pub email: String,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("access_token", &"[REDACTED]")
            .field("role", &self.role)
            .field("email", &self.email)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_base_url("CHODOCU_API_BASE_URL", DEFAULT_API_BASE_URL)?;
        let region_api_base_url =
            get_base_url("CHODOCU_REGION_API_BASE_URL", DEFAULT_REGION_API_BASE_URL)?;
        let http_timeout = get_secs("CHODOCU_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        let region_cache_ttl =
            get_secs("CHODOCU_REGION_CACHE_TTL_SECS", DEFAULT_REGION_CACHE_TTL_SECS)?;
        let session = SessionConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api_base_url,
            region_api_base_url,
            http_timeout,
            region_cache_ttl,
            session,
            sentry_dsn,
        })
    }

    /// Configuration pointing at `api_base_url` with every other value at
    /// its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base_url` is not an absolute URL.
    pub fn with_api_base_url(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: validate_base_url("api_base_url", api_base_url)?,
            region_api_base_url: DEFAULT_REGION_API_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(30),
            region_cache_ttl: Duration::from_secs(3600),
            session: None,
            sentry_dsn: None,
        })
    }

    /// The configured session as an auth context, if a token was supplied.
    #[must_use]
    pub fn session(&self) -> Option<AuthContext> {
        self.session.as_ref().map(|s| {
            AuthContext::new(s.access_token.expose_secret(), s.role, s.email.clone())
        })
    }

    /// The configured session, for commands that need one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` when no token was supplied.
    pub fn require_session(&self) -> Result<AuthContext, ConfigError> {
        self.session()
            .ok_or_else(|| ConfigError::MissingEnvVar("CHODOCU_ACCESS_TOKEN".to_string()))
    }
}

impl SessionConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(token) = get_optional_env("CHODOCU_ACCESS_TOKEN") else {
            return Ok(None);
        };
        let role = get_env_or_default("CHODOCU_ROLE", "user")
            .parse::<UserRole>()
            .map_err(|e| ConfigError::InvalidEnvVar("CHODOCU_ROLE".to_string(), e))?;

        Ok(Some(Self {
            access_token: SecretString::from(token),
            role,
            email: get_env_or_default("CHODOCU_EMAIL", ""),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a base URL, validated and stripped of trailing slashes.
fn get_base_url(key: &str, default: &str) -> Result<String, ConfigError> {
    validate_base_url(key, &get_env_or_default(key, default))
}

/// Get a duration given in whole seconds.
fn get_secs(key: &str, default: &str) -> Result<Duration, ConfigError> {
    get_env_or_default(key, default)
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn validate_base_url(key: &str, value: &str) -> Result<String, ConfigError> {
    let url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(value.trim_end_matches('/').to_string())
}
