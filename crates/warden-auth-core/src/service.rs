//! Auth service - ties together account lookup, password verification,
//! token issuance and persistence

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use warden_db::{AccountLookup, AccountStore};
use warden_types::{AuthResult, AuthenticatedIdentity, ErrorCode};

use crate::{
    attempt::{AttemptState, AuthenticationAttempt},
    clock::{Clock, SystemClock},
    config::AuthConfig,
    password::{PasswordSchemes, PasswordVerifier, StoredPassword},
    token::{RandomTokenGenerator, TokenGenerator},
    AuthError,
};

/// Authentication service
///
/// Runs one attempt per call:
/// - Look the identifier up (username or email)
/// - Verify the password under the account's stored scheme
/// - Issue a token, stamp the login time and save the account
///
/// Wrong identifiers and wrong passwords come back as an [`AuthResult`] with
/// a rejection code. Collaborator faults and failed saves are [`AuthError`]s.
pub struct AuthService<L: AccountLookup, S: AccountStore> {
    config: AuthConfig,
    lookup: Arc<L>,
    store: Arc<S>,
    verifier: Arc<dyn PasswordVerifier>,
    tokens: Arc<dyn TokenGenerator>,
    clock: Arc<dyn Clock>,
}

impl<L: AccountLookup, S: AccountStore> AuthService<L, S> {
    /// Create a new auth service with the built-in password schemes, the
    /// CSPRNG token generator and the system clock.
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] for out-of-range settings, or when
    /// timing equalisation is on and the decoy scheme is not registered.
    pub fn new(config: AuthConfig, lookup: Arc<L>, store: Arc<S>) -> Result<Self, AuthError> {
        config.validate()?;
        let tokens = RandomTokenGenerator::from_config(&config)?;
        let verifier = PasswordSchemes::with_defaults().with_decoy_scheme(&config.decoy_scheme);
        if config.equalize_timing && !verifier.supports(&config.decoy_scheme) {
            return Err(AuthError::Configuration(format!(
                "decoy scheme {} is not registered",
                config.decoy_scheme
            )));
        }

        Ok(Self {
            config,
            lookup,
            store,
            verifier: Arc::new(verifier),
            tokens: Arc::new(tokens),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the password verifier
    pub fn with_verifier(mut self, verifier: Arc<dyn PasswordVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Replace the token generator
    pub fn with_token_generator(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Service configuration
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Build the decoy hash now instead of on the first unknown identifier.
    ///
    /// Call once at startup, after the verifier is final.
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] when timing equalisation is on and
    /// the verifier cannot produce a decoy.
    pub async fn warm_up(&self) -> Result<(), AuthError> {
        if !self.config.equalize_timing {
            return Ok(());
        }
        let verifier = Arc::clone(&self.verifier);
        let decoy = tokio::task::spawn_blocking(move || verifier.decoy())
            .await
            .map_err(|e| AuthError::Internal(format!("decoy build task failed: {e}")))?;
        match decoy {
            Some(decoy) => {
                tracing::debug!(scheme = %decoy.scheme, "Decoy hash ready");
                Ok(())
            }
            None => Err(missing_decoy(&self.config.decoy_scheme)),
        }
    }

    /// Authenticate `identifier` with `password`.
    ///
    /// On success the returned result carries the new token, which has
    /// already been saved on the account. Placing it into session state is
    /// the caller's job.
    ///
    /// # Errors
    /// - [`AuthError::Lookup`] when the account lookup fails
    /// - [`AuthError::Verifier`] when the stored hash cannot be checked
    /// - [`AuthError::PersistenceFailed`] when the password was correct but
    ///   the login could not be saved; no token is handed out
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: SecretString,
    ) -> Result<AuthResult, AuthError> {
        let mut attempt = AuthenticationAttempt::new(identifier, password);

        let found = self.lookup.find_by_identifier(identifier).await.map_err(|e| {
            tracing::error!("Account lookup failed: {}", e);
            AuthError::Lookup(e)
        })?;
        attempt.advance(AttemptState::LookedUp)?;
        let password = attempt.take_password()?;

        let Some(mut account) = found else {
            self.check_password(password, None).await?;
            attempt.fail(ErrorCode::IdentifierInvalid)?;
            tracing::info!("Authentication rejected: unknown identifier");
            return attempt.rejection();
        };

        let stored = StoredPassword {
            hash: account.password_hash.clone(),
            scheme: account.password_scheme.clone(),
        };
        let verified = self.check_password(password, Some(stored)).await.map_err(|e| {
            tracing::error!(account_id = %account.id, scheme = %account.password_scheme, "Password check failed: {}", e);
            e
        })?;

        if !verified {
            attempt.fail(ErrorCode::CredentialInvalid)?;
            tracing::info!(account_id = %account.id, "Authentication rejected: invalid password");
            return attempt.rejection();
        }
        attempt.advance(AttemptState::Verified)?;

        let token = self.tokens.new_token();
        account.record_login(token.clone(), self.clock.now());
        attempt.issue(token.clone())?;

        if let Err(e) = self.store.save(&account).await {
            attempt.fail(ErrorCode::PersistenceFailed)?;
            match e.validation_errors() {
                Some(fields) => tracing::error!(
                    account_id = %account.id,
                    fields = %fields,
                    "Login refused by account store"
                ),
                None => tracing::error!(account_id = %account.id, "Failed to save login: {}", e),
            }
            return Err(AuthError::PersistenceFailed {
                account_id: account.id,
                source: e,
            });
        }
        attempt.advance(AttemptState::Persisted)?;

        tracing::info!(account_id = %account.id, "Authentication succeeded");

        Ok(AuthResult::authenticated(AuthenticatedIdentity {
            account_id: account.id,
            username: account.username,
            token,
        }))
    }

    /// Verify `password` off the async executor.
    ///
    /// With no stored password the decoy hash is checked instead and the
    /// answer is always `false`.
    async fn check_password(
        &self,
        password: SecretString,
        stored: Option<StoredPassword>,
    ) -> Result<bool, AuthError> {
        let verifier = Arc::clone(&self.verifier);
        let equalize = self.config.equalize_timing;

        let outcome = tokio::task::spawn_blocking(move || match stored {
            Some(stored) => verifier
                .verify(password.expose_secret(), &stored.hash, &stored.scheme)
                .map(Some),
            None if equalize => match verifier.decoy() {
                Some(decoy) => {
                    // Only the elapsed time matters here
                    let _ = verifier.verify(password.expose_secret(), &decoy.hash, &decoy.scheme);
                    Ok(Some(false))
                }
                None => Ok(None),
            },
            None => Ok(Some(false)),
        })
        .await
        .map_err(|e| AuthError::Internal(format!("password check task failed: {e}")))?;

        match outcome? {
            Some(verified) => Ok(verified),
            None => {
                tracing::error!(scheme = %self.config.decoy_scheme, "No decoy hash available, refusing to answer early");
                Err(missing_decoy(&self.config.decoy_scheme))
            }
        }
    }
}

fn missing_decoy(scheme: &str) -> AuthError {
    AuthError::Configuration(format!("no decoy hash available for scheme {scheme}"))
}

impl<L: AccountLookup, S: AccountStore> std::fmt::Debug for AuthService<L, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use warden_db::DbResult;
    use warden_types::Account;

    struct NoAccounts;

    #[async_trait]
    impl AccountLookup for NoAccounts {
        async fn find_by_identifier(&self, _: &str) -> DbResult<Option<Account>> {
            Ok(None)
        }
    }

    #[async_trait]
    impl AccountStore for NoAccounts {
        async fn save(&self, _: &Account) -> DbResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let repo = Arc::new(NoAccounts);
        let config = AuthConfig::new().with_token_bytes(4);
        let result = AuthService::new(config, Arc::clone(&repo), repo);
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_new_rejects_unregistered_decoy_scheme() {
        let repo = Arc::new(NoAccounts);
        let config = AuthConfig::new().with_decoy_scheme("bcrypt");
        let result = AuthService::new(config, Arc::clone(&repo), Arc::clone(&repo));
        assert!(matches!(result, Err(AuthError::Configuration(_))));

        // Irrelevant once equalisation is off
        let config = AuthConfig::new()
            .with_decoy_scheme("bcrypt")
            .with_equalize_timing(false);
        assert!(AuthService::new(config, Arc::clone(&repo), repo).is_ok());
    }

    #[tokio::test]
    async fn test_unknown_identifier_without_decoy() {
        let repo = Arc::new(NoAccounts);
        let config = AuthConfig::new().with_equalize_timing(false);
        let service = AuthService::new(config, Arc::clone(&repo), repo).unwrap();

        let result = service
            .authenticate("nobody", SecretString::from("pw".to_string()))
            .await
            .unwrap();
        assert_eq!(result.error_code(), ErrorCode::IdentifierInvalid);
        assert!(result.token().is_none());
    }
}
