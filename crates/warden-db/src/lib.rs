//! Warden DB - Account storage abstractions
//!
//! Repository traits consumed by the authentication core, plus an
//! SQLx/PostgreSQL implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use warden_db::{create_pool, AccountLookup, Repositories};
//!
//! let pool = create_pool("postgres://localhost/warden").await?;
//! let repos = Repositories::new(pool);
//!
//! let account = repos.accounts.find_by_identifier("alice@example.com").await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, create_pool_with_options, run_migrations, DbPool, PoolOptions};
pub use repo::*;
