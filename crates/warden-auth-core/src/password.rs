//! Password verification keyed by a stored scheme tag
//!
//! Each stored hash carries a tag naming the algorithm that produced it.
//! [`PasswordSchemes`] maps tags to [`PasswordScheme`] implementations and is
//! the production [`PasswordVerifier`].

use argon2::password_hash::{
    self, PasswordHash, PasswordHasher, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params as Argon2Params, Version};
use pbkdf2::{Params as Pbkdf2Params, Pbkdf2};
use rand::rngs::OsRng;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::crypto::random_bytes;

/// Scheme tag for Argon2id PHC strings
pub const ARGON2: &str = "argon2";

/// Scheme tag for PBKDF2-SHA256 PHC strings
pub const PBKDF2: &str = "pbkdf2";

/// Errors raised while checking or producing password hashes
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    /// No scheme is registered under the stored tag
    #[error("unsupported password scheme: {0}")]
    UnsupportedScheme(String),

    /// The stored hash cannot be parsed by its scheme
    #[error("malformed password hash for scheme {scheme}")]
    MalformedHash { scheme: String },

    /// Hashing itself failed
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// A stored hash together with its scheme tag
#[derive(Clone, PartialEq, Eq)]
pub struct StoredPassword {
    pub hash: String,
    pub scheme: String,
}

impl std::fmt::Debug for StoredPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredPassword")
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

/// Checks plaintext candidates against stored hashes
pub trait PasswordVerifier: Send + Sync {
    /// Whether `candidate` matches `stored_hash` under `scheme`.
    ///
    /// A mismatch is `Ok(false)`. Unknown schemes and unreadable hashes are
    /// errors.
    fn verify(&self, candidate: &str, stored_hash: &str, scheme: &str)
        -> Result<bool, PasswordError>;

    /// A hash that no real password matches, verified when an identifier is
    /// unknown so the miss costs as much as a hit.
    fn decoy(&self) -> Option<StoredPassword> {
        None
    }
}

/// A single hashing algorithm
pub trait PasswordScheme: Send + Sync {
    /// Check a candidate against a hash produced by this scheme
    fn verify(&self, candidate: &str, stored_hash: &str) -> Result<bool, PasswordError>;

    /// Produce a new salted hash
    fn hash(&self, password: &str) -> Result<String, PasswordError>;
}

fn check_phc<H: password_hash::PasswordVerifier>(
    hasher: &H,
    scheme: &str,
    candidate: &str,
    stored_hash: &str,
) -> Result<bool, PasswordError> {
    let malformed = || PasswordError::MalformedHash {
        scheme: scheme.to_string(),
    };
    let parsed = PasswordHash::new(stored_hash).map_err(|_| malformed())?;
    match hasher.verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(_) => Err(malformed()),
    }
}

fn new_salt() -> SaltString {
    SaltString::generate(&mut OsRng)
}

/// Argon2id hashing
#[derive(Clone)]
pub struct Argon2Scheme {
    argon: Argon2<'static>,
}

impl Argon2Scheme {
    /// Create a scheme that hashes with the given cost parameters.
    ///
    /// Verification always uses the parameters embedded in the stored hash.
    pub fn new(params: Argon2Params) -> Self {
        Self {
            argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl Default for Argon2Scheme {
    fn default() -> Self {
        Self::new(Argon2Params::default())
    }
}

impl PasswordScheme for Argon2Scheme {
    fn verify(&self, candidate: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        check_phc(&self.argon, ARGON2, candidate, stored_hash)
    }

    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        self.argon
            .hash_password(password.as_bytes(), &new_salt())
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }
}

/// PBKDF2-SHA256 hashing
#[derive(Debug, Clone)]
pub struct Pbkdf2Scheme {
    rounds: u32,
}

impl Pbkdf2Scheme {
    /// Create a scheme that hashes with `rounds` iterations
    pub fn new(rounds: u32) -> Self {
        Self { rounds }
    }
}

impl Default for Pbkdf2Scheme {
    fn default() -> Self {
        Self::new(Pbkdf2Params::default().rounds)
    }
}

impl PasswordScheme for Pbkdf2Scheme {
    fn verify(&self, candidate: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        check_phc(&Pbkdf2, PBKDF2, candidate, stored_hash)
    }

    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let params = Pbkdf2Params {
            rounds: self.rounds,
            output_length: 32,
        };
        Pbkdf2
            .hash_password_customized(password.as_bytes(), None, None, params, &new_salt())
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }
}

/// Registry of password schemes keyed by tag
pub struct PasswordSchemes {
    schemes: HashMap<String, Arc<dyn PasswordScheme>>,
    decoy_scheme: String,
    decoy: OnceLock<Option<StoredPassword>>,
}

impl PasswordSchemes {
    /// Empty registry; decoys are built with `decoy_scheme` once registered
    pub fn empty(decoy_scheme: impl Into<String>) -> Self {
        Self {
            schemes: HashMap::new(),
            decoy_scheme: decoy_scheme.into(),
            decoy: OnceLock::new(),
        }
    }

    /// Registry with the built-in `argon2` and `pbkdf2` schemes
    pub fn with_defaults() -> Self {
        Self::empty(ARGON2)
            .register(ARGON2, Argon2Scheme::default())
            .register(PBKDF2, Pbkdf2Scheme::default())
    }

    /// Add or replace a scheme. Tags are matched case-insensitively.
    pub fn register(mut self, tag: &str, scheme: impl PasswordScheme + 'static) -> Self {
        self.schemes.insert(tag.to_ascii_lowercase(), Arc::new(scheme));
        self
    }

    /// Choose the scheme used to build the decoy hash
    pub fn with_decoy_scheme(mut self, tag: impl Into<String>) -> Self {
        self.decoy_scheme = tag.into();
        self.decoy = OnceLock::new();
        self
    }

    /// Look up a scheme by tag
    pub fn get(&self, tag: &str) -> Result<&Arc<dyn PasswordScheme>, PasswordError> {
        self.schemes
            .get(&tag.to_ascii_lowercase())
            .ok_or_else(|| PasswordError::UnsupportedScheme(tag.to_string()))
    }

    /// Whether a scheme is registered under `tag`
    pub fn supports(&self, tag: &str) -> bool {
        self.schemes.contains_key(&tag.to_ascii_lowercase())
    }

    /// Hash `password` with the scheme registered under `tag`
    pub fn hash(&self, tag: &str, password: &str) -> Result<StoredPassword, PasswordError> {
        Ok(StoredPassword {
            hash: self.get(tag)?.hash(password)?,
            scheme: tag.to_string(),
        })
    }
}

impl Default for PasswordSchemes {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PasswordVerifier for PasswordSchemes {
    fn verify(
        &self,
        candidate: &str,
        stored_hash: &str,
        scheme: &str,
    ) -> Result<bool, PasswordError> {
        self.get(scheme)?.verify(candidate, stored_hash)
    }

    fn decoy(&self) -> Option<StoredPassword> {
        self.decoy
            .get_or_init(|| {
                let secret = hex::encode(random_bytes(32));
                match self.hash(&self.decoy_scheme, &secret) {
                    Ok(stored) => Some(stored),
                    Err(e) => {
                        tracing::warn!(scheme = %self.decoy_scheme, "Could not build decoy hash: {}", e);
                        None
                    }
                }
            })
            .clone()
    }
}

impl std::fmt::Debug for PasswordSchemes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<&str> = self.schemes.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("PasswordSchemes")
            .field("schemes", &tags)
            .field("decoy_scheme", &self.decoy_scheme)
            .finish_non_exhaustive()
    }
}
