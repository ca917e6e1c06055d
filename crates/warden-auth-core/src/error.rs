//! Auth errors

use thiserror::Error;
use warden_db::DbError;
use warden_types::{AccountId, ErrorCode, ValidationErrors};

use crate::password::PasswordError;

/// Faults raised while authenticating.
///
/// Wrong identifiers and wrong passwords are not errors; they come back as
/// [`ErrorCode`]s inside an `AuthResult`. Everything here means the system,
/// not the user, is in an unexpected state.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The account lookup itself failed
    #[error("account lookup failed: {0}")]
    Lookup(#[source] DbError),

    /// The stored password could not be checked
    #[error("password verification failed: {0}")]
    Verifier(#[from] PasswordError),

    /// Credentials were valid but the login could not be saved
    #[error("could not persist login for account {account_id}: {source}")]
    PersistenceFailed {
        account_id: AccountId,
        #[source]
        source: DbError,
    },

    /// Session state could not be recorded
    #[error("session store error: {0}")]
    Session(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Attempt classification carried by this fault, if any
    pub fn attempt_code(&self) -> Option<ErrorCode> {
        match self {
            Self::PersistenceFailed { .. } => Some(ErrorCode::PersistenceFailed),
            _ => None,
        }
    }

    /// Field-level messages from a refused save
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::PersistenceFailed { source, .. } => source.validation_errors(),
            _ => None,
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Lookup(_) => 503,
            Self::Verifier(_)
            | Self::PersistenceFailed { .. }
            | Self::Session(_)
            | Self::Configuration(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Lookup(_) => "LOOKUP_FAILED",
            Self::Verifier(_) => "VERIFIER_FAILED",
            Self::PersistenceFailed { .. } => "PERSISTENCE_FAILED",
            Self::Session(_) => "SESSION_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
