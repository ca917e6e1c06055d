//! Warden Auth Core - Credential authentication business logic
//!
//! Verifies a login identifier and password against stored accounts, issues
//! unpredictable session tokens and persists the login.

pub mod attempt;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod password;
pub mod service;
pub mod session;
pub mod token;

pub use attempt::*;
pub use clock::*;
pub use config::*;
pub use crypto::*;
pub use error::*;
pub use password::*;
pub use service::*;
pub use session::*;
pub use token::*;

pub use secrecy::SecretString;
