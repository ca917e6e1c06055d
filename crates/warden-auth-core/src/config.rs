//! Configuration types for the auth service

use std::str::FromStr;

use crate::AuthError;

/// How raw token bytes are rendered into a string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenEncoding {
    /// Lowercase hex, two characters per byte
    #[default]
    Hex,
    /// URL-safe base64 without padding
    Base64Url,
}

impl FromStr for TokenEncoding {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "base64url" | "base64" => Ok(Self::Base64Url),
            other => Err(AuthError::Configuration(format!(
                "unknown token encoding: {other}"
            ))),
        }
    }
}

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Random bytes per session token
    pub token_bytes: usize,
    /// Token string encoding
    pub token_encoding: TokenEncoding,
    /// Scheme used to build the decoy hash checked for unknown identifiers
    pub decoy_scheme: String,
    /// Verify a decoy hash when the identifier is unknown
    pub equalize_timing: bool,
}

impl AuthConfig {
    /// Smallest accepted token entropy (128 bits)
    pub const MIN_TOKEN_BYTES: usize = 16;

    /// Largest accepted token entropy; keeps encoded tokens storable
    pub const MAX_TOKEN_BYTES: usize = 64;

    /// Create a config with the defaults: 32-byte hex tokens, argon2 decoys
    pub fn new() -> Self {
        Self {
            token_bytes: 32,
            token_encoding: TokenEncoding::Hex,
            decoy_scheme: crate::password::ARGON2.to_string(),
            equalize_timing: true,
        }
    }

    /// Set token entropy in bytes
    pub fn with_token_bytes(mut self, bytes: usize) -> Self {
        self.token_bytes = bytes;
        self
    }

    /// Set token encoding
    pub fn with_token_encoding(mut self, encoding: TokenEncoding) -> Self {
        self.token_encoding = encoding;
        self
    }

    /// Set the decoy scheme
    pub fn with_decoy_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.decoy_scheme = scheme.into();
        self
    }

    /// Enable or disable decoy verification for unknown identifiers
    pub fn with_equalize_timing(mut self, enabled: bool) -> Self {
        self.equalize_timing = enabled;
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), AuthError> {
        if !(Self::MIN_TOKEN_BYTES..=Self::MAX_TOKEN_BYTES).contains(&self.token_bytes) {
            return Err(AuthError::Configuration(format!(
                "token_bytes must be between {} and {}, got {}",
                Self::MIN_TOKEN_BYTES,
                Self::MAX_TOKEN_BYTES,
                self.token_bytes
            )));
        }
        if self.decoy_scheme.is_empty() {
            return Err(AuthError::Configuration(
                "decoy_scheme must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}
