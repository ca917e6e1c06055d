//! Mock repositories and verifiers for testing

use argon2::Params;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use warden_auth_core::{
    Argon2Scheme, PasswordError, PasswordScheme, PasswordSchemes, SecretString, ARGON2,
};
use warden_db::{validate_login_fields, AccountLookup, AccountStore, DbError, DbResult};
use warden_types::{Account, AccountId, ValidationErrors};

/// How the mock store should refuse saves
#[derive(Debug, Clone)]
pub enum SaveFailure {
    /// Refuse with field-level messages
    Validation(ValidationErrors),
    /// The row disappeared
    NotFound,
}

/// In-memory account repository for testing
#[derive(Default, Clone)]
pub struct MockAccountRepository {
    accounts: Arc<DashMap<Uuid, Account>>,
    saves: Arc<Mutex<Vec<Account>>>,
    lookups: Arc<AtomicUsize>,
    failure: Arc<Mutex<Option<SaveFailure>>>,
}

impl MockAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a test account directly
    pub fn insert_account(&self, account: Account) {
        self.accounts.insert(account.id.0, account);
    }

    /// Current stored state of an account
    pub fn get(&self, id: AccountId) -> Option<Account> {
        self.accounts.get(&id.0).map(|r| r.value().clone())
    }

    /// Every account passed to `save`, in call order
    pub fn saved(&self) -> Vec<Account> {
        self.saves.lock().unwrap().clone()
    }

    /// Number of `save` calls
    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    /// Number of lookups served
    #[allow(dead_code)]
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Make every following save fail
    pub fn fail_saves(&self, failure: SaveFailure) {
        *self.failure.lock().unwrap() = Some(failure);
    }
}

#[async_trait]
impl AccountLookup for MockAccountRepository {
    async fn find_by_identifier(&self, identifier: &str) -> DbResult<Option<Account>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let mut matches: Vec<Account> = self
            .accounts
            .iter()
            .filter(|r| r.value().matches_identifier(identifier))
            .map(|r| r.value().clone())
            .collect();
        matches.sort_by_key(|a| a.id);
        Ok(matches.into_iter().next())
    }
}

#[async_trait]
impl AccountStore for MockAccountRepository {
    async fn save(&self, account: &Account) -> DbResult<()> {
        self.saves.lock().unwrap().push(account.clone());

        let failure = self.failure.lock().unwrap().clone();
        match failure {
            Some(SaveFailure::Validation(errors)) => return Err(DbError::Validation(errors)),
            Some(SaveFailure::NotFound) => return Err(DbError::NotFound),
            None => {}
        }

        validate_login_fields(account)?;
        match self.accounts.get_mut(&account.id.0) {
            Some(mut stored) => {
                stored.session_token = account.session_token.clone();
                stored.last_login_at = account.last_login_at;
                Ok(())
            }
            None => Err(DbError::NotFound),
        }
    }
}

/// Lookup that is always unreachable
pub struct FailingLookup;

#[async_trait]
impl AccountLookup for FailingLookup {
    async fn find_by_identifier(&self, _: &str) -> DbResult<Option<Account>> {
        Err(DbError::NotFound)
    }
}

/// Plaintext comparison scheme for high-volume tests
pub struct PlainScheme;

impl PasswordScheme for PlainScheme {
    fn verify(&self, candidate: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        Ok(candidate == stored_hash)
    }

    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Ok(password.to_string())
    }
}

/// Registry with minimum-cost argon2 plus the plaintext test scheme
pub fn cheap_schemes() -> PasswordSchemes {
    PasswordSchemes::empty(ARGON2)
        .register(ARGON2, Argon2Scheme::new(Params::new(8, 1, 1, None).unwrap()))
        .register("plain", PlainScheme)
}

/// Build an account whose password hashes to `password` under `scheme`
pub fn test_account(username: &str, password: &str, scheme: &str) -> Account {
    let stored = cheap_schemes().hash(scheme, password).unwrap();
    Account {
        id: AccountId::new(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: stored.hash,
        password_scheme: stored.scheme,
        session_token: None,
        last_login_at: None,
    }
}

/// Wrap a literal password
pub fn secret(password: &str) -> SecretString {
    SecretString::from(password.to_string())
}
