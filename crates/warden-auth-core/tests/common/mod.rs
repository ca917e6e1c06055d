//! Common test utilities for warden-auth-core integration tests

pub mod mock_repos;

#[allow(unused_imports)]
pub use mock_repos::{
    cheap_schemes, secret, test_account, FailingLookup, MockAccountRepository, PlainScheme,
    SaveFailure,
};
