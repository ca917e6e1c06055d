//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use warden_types::{Account, AccountId, SessionToken};

/// Account row from the database
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub password_scheme: String,
    pub session_token: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountRow {
    /// Get the typed account ID
    pub fn account_id(&self) -> AccountId {
        AccountId(self.id)
    }
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: AccountId(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            password_scheme: row.password_scheme,
            session_token: row.session_token.map(SessionToken::from),
            last_login_at: row.last_login_at,
        }
    }
}
