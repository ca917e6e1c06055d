//! HTTP handlers

mod auth;
mod health;

pub use auth::{login, logout, session};
pub use health::{health, ready};
