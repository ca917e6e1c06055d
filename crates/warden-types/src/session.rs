//! Session token type

use serde::{Deserialize, Serialize};

/// Opaque session token issued on successful authentication.
///
/// `Debug` never prints the value; use [`SessionToken::as_str`] where the
/// raw token is genuinely needed (persistence, response bodies).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap an already generated token value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw token value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the encoded token
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the token is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the wrapper and return the raw value
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionToken(len={})", self.0.len())
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}
