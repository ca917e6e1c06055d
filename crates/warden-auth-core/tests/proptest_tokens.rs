//! Property-based tests for token issuance and rejection invariants
//!
//! These tests verify:
//! - Tokens never repeat across many successful logins
//! - Token bytes look uniformly random
//! - Unknown identifiers and wrong passwords never mutate an account

mod common;

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use warden_auth_core::{AuthConfig, AuthService, RandomTokenGenerator, TokenEncoding, TokenGenerator};
use warden_types::ErrorCode;

use common::{cheap_schemes, secret, test_account, MockAccountRepository};

type Service = AuthService<MockAccountRepository, MockAccountRepository>;

fn plain_service(repo: &MockAccountRepository) -> Service {
    let shared = Arc::new(repo.clone());
    AuthService::new(AuthConfig::default(), Arc::clone(&shared), shared)
        .unwrap()
        .with_verifier(Arc::new(cheap_schemes()))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// ============================================================================
// Volume
// ============================================================================

#[tokio::test]
async fn test_ten_thousand_logins_never_repeat_a_token() {
    let repo = MockAccountRepository::new();
    repo.insert_account(test_account("alice", "correct-pw", "plain"));
    let service = plain_service(&repo);

    let mut seen = HashSet::new();
    let mut nibble_counts = [0usize; 16];

    for _ in 0..10_000 {
        let result = service
            .authenticate("alice", secret("correct-pw"))
            .await
            .unwrap();
        let token = result.token().unwrap().as_str().to_string();
        for c in token.chars() {
            let nibble = c.to_digit(16).expect("hex token") as usize;
            nibble_counts[nibble] += 1;
        }
        assert!(seen.insert(token), "token repeated");
    }

    assert_eq!(repo.save_count(), 10_000);

    // 640,000 hex digits, 40,000 expected per value, sigma ~194
    let expected = 10_000 * 64 / 16;
    for (nibble, count) in nibble_counts.iter().enumerate() {
        let deviation = count.abs_diff(expected);
        assert!(
            deviation < expected / 20,
            "hex digit {nibble:x} seen {count} times, expected about {expected}"
        );
    }
}

#[test]
fn test_token_bits_are_balanced() {
    let generator = RandomTokenGenerator::new(32, TokenEncoding::Hex).unwrap();
    let mut ones = 0u32;
    let samples = 2_000;

    for _ in 0..samples {
        let raw = hex::decode(generator.new_token().as_str()).unwrap();
        ones += raw.iter().map(|b| b.count_ones()).sum::<u32>();
    }

    // 512,000 bits, sigma ~358
    let total = samples * 32 * 8;
    let ratio = f64::from(ones) / f64::from(total);
    assert!((0.49..0.51).contains(&ratio), "ones ratio {ratio}");
}

// ============================================================================
// Rejection invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: identifiers matching no account are always IdentifierInvalid
    #[test]
    fn prop_unknown_identifier_never_mutates(
        identifier in "[a-z0-9@._-]{1,40}",
        password in ".{0,64}",
    ) {
        prop_assume!(identifier != "alice" && identifier != "alice@example.com");

        let repo = MockAccountRepository::new();
        let alice = test_account("alice", "correct-pw", "plain");
        let id = alice.id;
        repo.insert_account(alice);
        let service = plain_service(&repo);

        let result = runtime()
            .block_on(service.authenticate(&identifier, secret(&password)))
            .unwrap();

        prop_assert_eq!(result.error_code(), ErrorCode::IdentifierInvalid);
        prop_assert!(result.token().is_none());
        prop_assert_eq!(repo.save_count(), 0);
        prop_assert!(repo.get(id).unwrap().session_token.is_none());
    }

    /// Property: any password other than the stored one is CredentialInvalid
    #[test]
    fn prop_wrong_password_never_mutates(password in ".{0,64}") {
        prop_assume!(password != "correct-pw");

        let repo = MockAccountRepository::new();
        let alice = test_account("alice", "correct-pw", "plain");
        let id = alice.id;
        repo.insert_account(alice);
        let service = plain_service(&repo);

        let result = runtime()
            .block_on(service.authenticate("alice", secret(&password)))
            .unwrap();

        prop_assert_eq!(result.error_code(), ErrorCode::CredentialInvalid);
        prop_assert!(result.token().is_none());
        prop_assert_eq!(repo.save_count(), 0);
        prop_assert!(repo.get(id).unwrap().last_login_at.is_none());
    }

    /// Property: tokens of any accepted size are well-formed and storable
    #[test]
    fn prop_token_shape(bytes in 16usize..=64, base64 in any::<bool>()) {
        let encoding = if base64 { TokenEncoding::Base64Url } else { TokenEncoding::Hex };
        let generator = RandomTokenGenerator::new(bytes, encoding).unwrap();
        let token = generator.new_token();

        prop_assert_eq!(token.len(), generator.encoded_len());
        prop_assert!(token.len() <= warden_db::MAX_SESSION_TOKEN_LEN);
        prop_assert!(token
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
