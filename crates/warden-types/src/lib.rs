//! Warden Types - Shared domain types
//!
//! This crate contains the domain types used across Warden crates:
//! - Accounts and their identifiers
//! - Session tokens and authentication results
//! - Field-level validation errors reported by account stores

pub mod account;
pub mod auth;
pub mod session;
pub mod validation;

pub use account::*;
pub use auth::*;
pub use session::*;
pub use validation::*;
