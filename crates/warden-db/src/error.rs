//! Database errors

use thiserror::Error;
use warden_types::ValidationErrors;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("record not found")]
    NotFound,

    /// The record was refused before it was written
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
}

impl DbError {
    /// Field-level messages, when the failure was a validation refusal
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for DbError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Result alias for repository operations
pub type DbResult<T> = Result<T, DbError>;
