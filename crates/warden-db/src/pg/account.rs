//! PostgreSQL account repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use warden_types::Account;

use crate::error::{DbError, DbResult};
use crate::models::AccountRow;
use crate::repo::{validate_login_fields, AccountLookup, AccountStore};

/// PostgreSQL account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    /// Create a new account repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountLookup for PgAccountRepository {
    async fn find_by_identifier(&self, identifier: &str) -> DbResult<Option<Account>> {
        // Unique indexes cover each column separately; a username that equals
        // another account's email can still produce two rows.
        let mut rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, username, email, password_hash, password_scheme,
                   session_token, last_login_at, created_at, updated_at
            FROM accounts
            WHERE username = $1 OR email = $1
            ORDER BY id
            LIMIT 2
            "#,
        )
        .bind(identifier)
        .fetch_all(&self.pool)
        .await?;

        if rows.len() > 1 {
            tracing::warn!(
                first = %rows[0].account_id(),
                second = %rows[1].account_id(),
                "Login identifier matches more than one account, using the first"
            );
        }

        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0).into())
        })
    }
}

#[async_trait]
impl AccountStore for PgAccountRepository {
    async fn save(&self, account: &Account) -> DbResult<()> {
        validate_login_fields(account)?;

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET session_token = $2, last_login_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(account.id.0)
        .bind(account.session_token.as_ref().map(|t| t.as_str()))
        .bind(account.last_login_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
