//! Request-scoped authentication attempt and its state machine

use secrecy::SecretString;
use warden_types::{AuthResult, ErrorCode, SessionToken};

use crate::AuthError;

/// Where an attempt currently stands.
///
/// ```text
/// Start -> LookedUp -> Verified -> TokenIssued -> Persisted
///              |                        \-> Failed(PersistenceFailed)
///              \-> Failed(IdentifierInvalid | CredentialInvalid)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Start,
    LookedUp,
    Verified,
    TokenIssued,
    Persisted,
    Failed(ErrorCode),
}

impl AttemptState {
    /// Whether no further transition is allowed
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Persisted | Self::Failed(_))
    }

    /// Whether moving from `self` to `next` is a legal step
    pub fn can_transition_to(self, next: Self) -> bool {
        use AttemptState::*;
        matches!(
            (self, next),
            (Start, LookedUp)
                | (LookedUp, Verified)
                | (LookedUp, Failed(ErrorCode::IdentifierInvalid))
                | (LookedUp, Failed(ErrorCode::CredentialInvalid))
                | (Verified, TokenIssued)
                | (TokenIssued, Persisted)
                | (TokenIssued, Failed(ErrorCode::PersistenceFailed))
        )
    }

    fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::LookedUp => "looked_up",
            Self::Verified => "verified",
            Self::TokenIssued => "token_issued",
            Self::Persisted => "persisted",
            Self::Failed(_) => "failed",
        }
    }
}

impl std::fmt::Display for AttemptState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed(code) => write!(f, "failed({code})"),
            other => f.write_str(other.name()),
        }
    }
}

/// One authentication attempt.
///
/// Owns the plaintext password until verification takes it; after that the
/// attempt holds no secret except the issued token.
#[derive(Debug)]
pub struct AuthenticationAttempt {
    identifier: String,
    password: Option<SecretString>,
    state: AttemptState,
    error_code: ErrorCode,
    token: Option<SessionToken>,
}

impl AuthenticationAttempt {
    /// Start an attempt for the supplied credentials
    pub fn new(identifier: impl Into<String>, password: SecretString) -> Self {
        Self {
            identifier: identifier.into(),
            password: Some(password),
            state: AttemptState::Start,
            error_code: ErrorCode::None,
            token: None,
        }
    }

    /// Supplied identifier
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Current state
    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Classification so far
    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    /// Issued token, once the attempt reached `TokenIssued`
    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// Hand the password over for verification. Only succeeds once.
    pub fn take_password(&mut self) -> Result<SecretString, AuthError> {
        self.password
            .take()
            .ok_or_else(|| AuthError::Internal("password already consumed".to_string()))
    }

    /// Move to `next`, refusing illegal transitions
    pub fn advance(&mut self, next: AttemptState) -> Result<(), AuthError> {
        if !self.state.can_transition_to(next) {
            return Err(AuthError::Internal(format!(
                "illegal attempt transition {} -> {}",
                self.state, next
            )));
        }
        tracing::debug!(from = %self.state, to = %next, "Attempt transition");
        self.state = next;
        if let AttemptState::Failed(code) = next {
            self.error_code = code;
            self.token = None;
        }
        Ok(())
    }

    /// Terminate with `code`
    pub fn fail(&mut self, code: ErrorCode) -> Result<(), AuthError> {
        self.advance(AttemptState::Failed(code))
    }

    /// Record the freshly minted token
    pub fn issue(&mut self, token: SessionToken) -> Result<(), AuthError> {
        self.advance(AttemptState::TokenIssued)?;
        self.token = Some(token);
        Ok(())
    }

    /// Result for a rejected attempt
    pub fn rejection(&self) -> Result<AuthResult, AuthError> {
        let result = match self.state {
            AttemptState::Failed(code) => AuthResult::rejected(code),
            _ => None,
        };
        result.ok_or_else(|| {
            AuthError::Internal(format!("attempt in state {} is not a rejection", self.state))
        })
    }
}
