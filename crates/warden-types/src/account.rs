//! Account types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::SessionToken;

/// Unique account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Create a new random account ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from a string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for AccountId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A registered account as seen by the authentication core.
///
/// Accounts are created and edited elsewhere. Authentication only ever
/// touches `session_token` and `last_login_at`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable account ID
    pub id: AccountId,
    /// Login name
    pub username: String,
    /// Email address (also accepted as a login identifier)
    pub email: String,
    /// Stored password hash, opaque to the core
    pub password_hash: String,
    /// Tag naming the scheme that produced `password_hash`
    pub password_scheme: String,
    /// Session token issued by the most recent successful login
    pub session_token: Option<SessionToken>,
    /// Time of the most recent successful login
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Whether `identifier` names this account by username or email.
    ///
    /// Exact, case-sensitive comparison. Stores may apply their own policy.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        self.username == identifier || self.email == identifier
    }

    /// Record a successful login.
    pub fn record_login(&mut self, token: SessionToken, at: DateTime<Utc>) {
        self.session_token = Some(token);
        self.last_login_at = Some(at);
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_scheme", &self.password_scheme)
            .field("has_session_token", &self.session_token.is_some())
            .field("last_login_at", &self.last_login_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            id: AccountId::new(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA".to_string(),
            password_scheme: "argon2".to_string(),
            session_token: None,
            last_login_at: None,
        }
    }

    #[test]
    fn test_matches_username_or_email() {
        let account = account();
        assert!(account.matches_identifier("alice"));
        assert!(account.matches_identifier("alice@example.com"));
        assert!(!account.matches_identifier("Alice"));
        assert!(!account.matches_identifier("bob"));
    }

    #[test]
    fn test_record_login_sets_both_fields() {
        let mut account = account();
        let now = Utc::now();
        account.record_login(SessionToken::new("abc"), now);
        assert_eq!(account.session_token.as_ref().map(SessionToken::as_str), Some("abc"));
        assert_eq!(account.last_login_at, Some(now));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let mut account = account();
        account.record_login(SessionToken::new("very-secret-token"), Utc::now());
        let debug = format!("{account:?}");
        assert!(!debug.contains("very-secret-token"));
        assert!(!debug.contains("argon2id"));
        assert!(debug.contains("alice"));
    }

    #[test]
    fn test_account_id_roundtrip() {
        let id = AccountId::new();
        assert_eq!(AccountId::parse(&id.to_string()).unwrap(), id);
        assert!(AccountId::parse("not-a-uuid").is_err());
    }
}
