/// Signup and login flows
///
/// Composes the password hasher, the token issuer and a credential store.

use std::sync::Arc;

use chrono::Duration;
use serde_json::{json, Map};

use crate::auth::claims::{ROLE_CLAIM, USER_ID_CLAIM};
use crate::auth::jwt::TokenIssuer;
use crate::auth::password::PasswordHasher;
use crate::error::{AppError, AuthError, DatabaseError};
use crate::store::{Credential, CredentialStore, NewCredential};

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    token_ttl: Duration,
    /// Verified against when the subject is unknown, so both login failure
    /// paths cost one bcrypt verification.
    dummy_hash: String,
}

impl AuthService {
    /// # Errors
    /// Returns `AppError::Internal` if the placeholder hash cannot be computed
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        issuer: TokenIssuer,
        token_ttl: Duration,
    ) -> Result<Self, AppError> {
        let dummy_hash = hasher.hash(&uuid::Uuid::new_v4().to_string())?;

        Ok(Self {
            store,
            hasher,
            issuer,
            token_ttl,
            dummy_hash,
        })
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Register a new subject
    ///
    /// # Errors
    /// * `AuthError::DuplicateSubject` - subject already has a credential
    /// * `AppError::Database` - store failure
    pub async fn signup(
        &self,
        subject: &str,
        password: &str,
        role: &str,
    ) -> Result<Credential, AppError> {
        if self.store.find_by_subject(subject).await?.is_some() {
            return Err(AuthError::DuplicateSubject.into());
        }

        let password_hash = hash_blocking(self.hasher, password.to_string()).await?;

        let credential = self
            .store
            .insert(NewCredential {
                subject: subject.to_string(),
                password_hash,
                role: role.to_string(),
            })
            .await
            .map_err(|e| match e {
                DatabaseError::UniqueConstraintViolation(_) => {
                    AppError::Auth(AuthError::DuplicateSubject)
                }
                other => AppError::Database(other),
            })?;

        tracing::info!(subject = %credential.subject, user_id = credential.id, "Subject registered");
        Ok(credential)
    }

    /// Verify a subject's password and mint an access token
    ///
    /// # Errors
    /// * `AuthError::InvalidCredentials` - unknown subject or wrong password,
    ///   indistinguishable from each other
    /// * `AppError::Database` - store failure
    pub async fn login(&self, subject: &str, password: &str) -> Result<String, AppError> {
        let credential = self.store.find_by_subject(subject).await?;

        let stored_hash = credential
            .as_ref()
            .map_or_else(|| self.dummy_hash.clone(), |c| c.password_hash.clone());

        let verified = match verify_blocking(self.hasher, password.to_string(), stored_hash).await? {
            Ok(verified) => verified,
            Err(e) => {
                tracing::error!(subject = %subject, error = %e, "Stored credential is unusable");
                false
            }
        };

        let credential = match credential {
            Some(credential) if verified => credential,
            _ => {
                tracing::warn!(subject = %subject, "Login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let mut claims = Map::new();
        claims.insert(ROLE_CLAIM.to_string(), json!(credential.role));
        claims.insert(USER_ID_CLAIM.to_string(), json!(credential.id));

        let token = self.issuer.mint(&credential.subject, claims, self.token_ttl)?;

        tracing::info!(subject = %credential.subject, user_id = credential.id, "Access token issued");
        Ok(token)
    }
}

async fn hash_blocking(hasher: PasswordHasher, password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
}

async fn verify_blocking(
    hasher: PasswordHasher,
    password: String,
    hash: String,
) -> Result<Result<bool, AuthError>, AppError> {
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))
}
