//! Cryptographic helpers shared by token issuance and session tracking

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Fill a fresh buffer of `len` bytes from the operating system CSPRNG.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    OsRng.fill_bytes(&mut buf);
    buf
}

/// Securely hash a token for storage.
///
/// Uses SHA-256 to create a one-way hash of the token.
/// The original token cannot be recovered from the hash.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
