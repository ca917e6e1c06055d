//! Repository traits
//!
//! Async interfaces the authentication core needs from account storage.

use async_trait::async_trait;
use warden_types::{Account, ValidationErrors};

use crate::error::DbResult;

/// Maximum stored length of a session token
pub const MAX_SESSION_TOKEN_LEN: usize = 128;

/// Resolves login identifiers to accounts
#[async_trait]
pub trait AccountLookup: Send + Sync {
    /// Find the account whose username or email equals `identifier`.
    ///
    /// Implementations that can see more than one match must return one of
    /// them rather than failing.
    async fn find_by_identifier(&self, identifier: &str) -> DbResult<Option<Account>>;
}

/// Durably persists login mutations of an account
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist the account's session token and last-login timestamp.
    ///
    /// All or nothing: on error neither field is committed. Refused writes
    /// are reported as [`DbError::Validation`](crate::DbError::Validation).
    async fn save(&self, account: &Account) -> DbResult<()>;
}

/// Check the fields written by a login before they reach storage.
pub fn validate_login_fields(account: &Account) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    match &account.session_token {
        None => errors.add("session_token", "must be present"),
        Some(token) if token.is_empty() => errors.add("session_token", "must not be empty"),
        Some(token) => {
            if token.len() > MAX_SESSION_TOKEN_LEN {
                errors.add(
                    "session_token",
                    format!("must be at most {MAX_SESSION_TOKEN_LEN} characters"),
                );
            }
            if !token
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                errors.add("session_token", "contains invalid characters");
            }
        }
    }

    if account.last_login_at.is_none() {
        errors.add("last_login_at", "must be present");
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use warden_types::{AccountId, SessionToken};

    fn account(token: Option<&str>) -> Account {
        Account {
            id: AccountId::new(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            password_scheme: "argon2".to_string(),
            session_token: token.map(SessionToken::new),
            last_login_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_valid_login_fields() {
        assert!(validate_login_fields(&account(Some(&"a".repeat(64)))).is_ok());
        assert!(validate_login_fields(&account(Some("AbC-_09"))).is_ok());
    }

    #[test]
    fn test_missing_token_rejected() {
        let errors = validate_login_fields(&account(None)).unwrap_err();
        assert_eq!(errors.get("session_token").unwrap(), ["must be present"]);
    }

    #[test]
    fn test_overlong_token_rejected() {
        let long = "a".repeat(MAX_SESSION_TOKEN_LEN + 1);
        let errors = validate_login_fields(&account(Some(&long))).unwrap_err();
        assert!(errors.get("session_token").is_some());
    }

    #[test]
    fn test_token_charset_enforced() {
        let errors = validate_login_fields(&account(Some("abc def"))).unwrap_err();
        assert_eq!(
            errors.get("session_token").unwrap(),
            ["contains invalid characters"]
        );
    }

    #[test]
    fn test_missing_timestamp_rejected() {
        let mut account = account(Some("abc"));
        account.last_login_at = None;
        let errors = validate_login_fields(&account).unwrap_err();
        assert!(errors.get("last_login_at").is_some());
        assert!(errors.get("session_token").is_none());
    }
}
