//! Authentication outcome types

use serde::{Deserialize, Serialize};

use crate::{AccountId, SessionToken};

/// Outcome classification of an authentication attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Credentials were valid and the login was persisted
    #[default]
    None,
    /// No account matches the supplied identifier
    IdentifierInvalid,
    /// An account matched but the password did not verify
    CredentialInvalid,
    /// Credentials were valid but the login could not be persisted
    PersistenceFailed,
}

impl ErrorCode {
    /// Whether this code is a routine rejection of user input.
    ///
    /// Public surfaces must not distinguish between rejection codes.
    pub fn is_rejection(self) -> bool {
        matches!(self, Self::IdentifierInvalid | Self::CredentialInvalid)
    }

    /// Whether the attempt succeeded
    pub fn is_success(self) -> bool {
        self == Self::None
    }

    /// Stable string form
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::IdentifierInvalid => "identifier_invalid",
            Self::CredentialInvalid => "credential_invalid",
            Self::PersistenceFailed => "persistence_failed",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity established by a successful authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    /// Authenticated account
    pub account_id: AccountId,
    /// Display name of the account
    pub username: String,
    /// Freshly issued session token
    pub token: SessionToken,
}

/// Result of `authenticate`.
///
/// Carries an identity exactly when the code is [`ErrorCode::None`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    error_code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    identity: Option<AuthenticatedIdentity>,
}

impl AuthResult {
    /// Successful authentication
    pub fn authenticated(identity: AuthenticatedIdentity) -> Self {
        Self {
            error_code: ErrorCode::None,
            identity: Some(identity),
        }
    }

    /// Rejected authentication, no token issued.
    ///
    /// Returns `None` unless `code` is a rejection code.
    pub fn rejected(code: ErrorCode) -> Option<Self> {
        code.is_rejection().then_some(Self {
            error_code: code,
            identity: None,
        })
    }

    /// Outcome classification
    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    /// Whether the attempt succeeded
    pub fn is_authenticated(&self) -> bool {
        self.error_code.is_success() && self.identity.is_some()
    }

    /// Issued session token, present only on success
    pub fn token(&self) -> Option<&SessionToken> {
        self.identity.as_ref().map(|i| &i.token)
    }

    /// Established identity, present only on success
    pub fn identity(&self) -> Option<&AuthenticatedIdentity> {
        self.identity.as_ref()
    }

    /// Take the identity out of the result
    pub fn into_identity(self) -> Option<AuthenticatedIdentity> {
        self.identity
    }
}
