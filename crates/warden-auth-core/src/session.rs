//! Session state recording for issued tokens
//!
//! The core hands the token back to its caller; a [`SessionSink`] is where
//! the caller puts it so later requests can be recognised.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use warden_types::{AccountId, AuthenticatedIdentity};

use crate::{clock::Clock, crypto::hash_token, AuthError, SystemClock};

/// Records the token issued to the current caller
#[async_trait]
pub trait SessionSink: Send + Sync {
    /// Remember `identity` as authenticated
    async fn record(&self, identity: &AuthenticatedIdentity) -> Result<(), AuthError>;
}

/// A recorded session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    pub account_id: AccountId,
    pub username: String,
    pub issued_at: DateTime<Utc>,
}

/// In-memory session state keyed by SHA-256 of the token.
///
/// Holds at most one session per account, matching the single token stored
/// on the account: recording a new login drops the previous one.
///
/// Sessions live only in process memory and are gone after a restart, even
/// though the token is still stored on the account.
#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Arc<DashMap<String, SessionEntry>>,
    /// Current token hash per account. Its entry lock serialises logins of
    /// one account.
    by_account: Arc<DashMap<AccountId, String>>,
    clock: Arc<dyn Clock>,
}

impl MemorySessionStore {
    /// Create an empty store using the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store with an explicit clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            by_account: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Resolve a presented token
    pub fn find(&self, token: &str) -> Option<SessionEntry> {
        self.sessions
            .get(&hash_token(token))
            .map(|r| r.value().clone())
    }

    /// Forget a token. Returns whether it was known.
    pub fn remove(&self, token: &str) -> bool {
        let key = hash_token(token);
        match self.sessions.remove(&key) {
            Some((_, entry)) => {
                self.by_account
                    .remove_if(&entry.account_id, |_, current| *current == key);
                true
            }
            None => false,
        }
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are recorded
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionSink for MemorySessionStore {
    async fn record(&self, identity: &AuthenticatedIdentity) -> Result<(), AuthError> {
        let key = hash_token(identity.token.as_str());
        let entry = SessionEntry {
            account_id: identity.account_id,
            username: identity.username.clone(),
            issued_at: self.clock.now(),
        };

        // `sessions` is only touched while the account slot is held
        match self.by_account.entry(identity.account_id) {
            Entry::Occupied(mut slot) => {
                let previous = slot.insert(key.clone());
                self.sessions.remove(&previous);
                self.sessions.insert(key, entry);
                tracing::debug!(account_id = %identity.account_id, "Session replaced");
            }
            Entry::Vacant(slot) => {
                self.sessions.insert(key.clone(), entry);
                slot.insert(key);
                tracing::debug!(account_id = %identity.account_id, "Session recorded");
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionStore")
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}
