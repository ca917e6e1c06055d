//! Application state

use std::ops::Deref;
use std::sync::Arc;

use warden_auth_core::{AuthService, MemorySessionStore};
use warden_db::pg::PgAccountRepository;
use warden_db::DbPool;

use crate::config::Config;

/// Type alias for the auth service with concrete repository types
pub type AuthServiceImpl = AuthService<PgAccountRepository, PgAccountRepository>;

/// Shared database pool wrapper for health checks
#[derive(Clone)]
pub struct SharedPool(Arc<DbPool>);

impl Deref for SharedPool {
    type Target = DbPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Auth service for credential checks and token issuance
    pub auth: Arc<AuthServiceImpl>,
    /// Issued session tokens
    pub sessions: MemorySessionStore,
    /// Database connection pool (shared reference for health checks)
    pub pool: SharedPool,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(auth: AuthServiceImpl, pool: DbPool, config: Config) -> Self {
        Self {
            auth: Arc::new(auth),
            sessions: MemorySessionStore::new(),
            pool: SharedPool(Arc::new(pool)),
            config: Arc::new(config),
        }
    }
}
