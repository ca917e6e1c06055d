//! Session token generation

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use warden_types::SessionToken;

use crate::{crypto::random_bytes, AuthConfig, AuthError, TokenEncoding};

/// Produces fresh, unpredictable session tokens
pub trait TokenGenerator: Send + Sync {
    /// Mint a new token. Every call must be independent of the last.
    fn new_token(&self) -> SessionToken;
}

/// Token generator backed by the operating system CSPRNG.
///
/// Tokens carry no structure: they are `bytes` random bytes rendered with
/// the configured encoding, nothing derived from time, process or counters.
#[derive(Debug, Clone)]
pub struct RandomTokenGenerator {
    bytes: usize,
    encoding: TokenEncoding,
}

impl RandomTokenGenerator {
    /// Create a generator for `bytes` random bytes per token
    ///
    /// # Errors
    /// Returns a configuration error when `bytes` is outside the accepted range.
    pub fn new(bytes: usize, encoding: TokenEncoding) -> Result<Self, AuthError> {
        AuthConfig::new()
            .with_token_bytes(bytes)
            .with_token_encoding(encoding)
            .validate()?;
        Ok(Self { bytes, encoding })
    }

    /// Create a generator from service configuration
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        Self::new(config.token_bytes, config.token_encoding)
    }

    /// Length of the tokens this generator produces
    pub fn encoded_len(&self) -> usize {
        match self.encoding {
            TokenEncoding::Hex => self.bytes * 2,
            TokenEncoding::Base64Url => (self.bytes * 4).div_ceil(3),
        }
    }
}

impl Default for RandomTokenGenerator {
    fn default() -> Self {
        Self {
            bytes: 32,
            encoding: TokenEncoding::Hex,
        }
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn new_token(&self) -> SessionToken {
        let raw = random_bytes(self.bytes);
        let encoded = match self.encoding {
            TokenEncoding::Hex => hex::encode(raw),
            TokenEncoding::Base64Url => URL_SAFE_NO_PAD.encode(raw),
        };
        SessionToken::from(encoded)
    }
}
