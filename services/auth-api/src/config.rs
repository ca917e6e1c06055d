//! Configuration for the Auth API service.

use std::time::Duration;
use warden_auth_core::{AuthConfig, TokenEncoding};

/// Auth API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Database URL
    pub database_url: String,

    /// Apply pending migrations on startup
    pub run_migrations: bool,

    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,

    /// Auth core configuration
    pub auth: AuthConfig,

    /// Request timeout
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Database
        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let run_migrations = get("RUN_MIGRATIONS")
            .map(|v| v.parse().map_err(|_| ConfigError::Invalid("RUN_MIGRATIONS")))
            .transpose()?
            .unwrap_or(false);

        // Server
        let http_port = get("HTTP_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        let request_timeout_secs: u64 = get("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        let json_logs = match get("LOG_FORMAT").as_deref() {
            None | Some("text") => false,
            Some("json") => true,
            Some(_) => return Err(ConfigError::Invalid("LOG_FORMAT")),
        };

        // Token issuance
        let mut auth = AuthConfig::new();
        if let Some(bytes) = get("TOKEN_BYTES") {
            let bytes = bytes
                .parse()
                .map_err(|_| ConfigError::Invalid("TOKEN_BYTES"))?;
            auth = auth.with_token_bytes(bytes);
        }
        if let Some(encoding) = get("TOKEN_ENCODING") {
            let encoding: TokenEncoding = encoding
                .parse()
                .map_err(|_| ConfigError::Invalid("TOKEN_ENCODING"))?;
            auth = auth.with_token_encoding(encoding);
        }
        if let Some(equalize) = get("EQUALIZE_TIMING") {
            let equalize = equalize
                .parse()
                .map_err(|_| ConfigError::Invalid("EQUALIZE_TIMING"))?;
            auth = auth.with_equalize_timing(equalize);
        }
        auth.validate()
            .map_err(|e| ConfigError::AuthConfig(e.to_string()))?;

        Ok(Self {
            http_port,
            database_url,
            run_migrations,
            json_logs,
            auth,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Auth config error: {0}")]
    AuthConfig(String),
}
