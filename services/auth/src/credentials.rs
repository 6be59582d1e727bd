//! Credential store and session issuer
//!
//! Registration hashes and stores a user; authentication checks the password
//! and issues a token pair; access verification turns a presented token back
//! into a user id. Nothing here keeps session state.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AuthError;
use crate::jwt::{JwtService, TokenPair};
use crate::models::NewUser;
use crate::password;
use crate::repositories::UserStore;
use crate::validation::{normalize_email, validate_email, validate_password, validate_username};

/// Front door for all credential operations
#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserStore>,
    jwt: JwtService,
}

impl CredentialService {
    pub fn new(users: Arc<dyn UserStore>, jwt: JwtService) -> Self {
        Self { users, jwt }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Create a user and return its id
    ///
    /// Fails with [`AuthError::DuplicateUser`] when the email is taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        plaintext_password: &str,
    ) -> Result<Uuid, AuthError> {
        let email = normalize_email(email);
        validate_username(username).map_err(AuthError::Validation)?;
        validate_email(&email).map_err(AuthError::Validation)?;
        validate_password(plaintext_password).map_err(AuthError::Validation)?;

        let plaintext = plaintext_password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plaintext))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))??;

        let user = self
            .users
            .insert(&NewUser {
                username: username.trim().to_string(),
                email,
                password_hash,
            })
            .await?;

        info!("User registered: {}", user.id);
        Ok(user.id)
    }

    /// Check credentials and issue a fresh access/refresh pair
    pub async fn authenticate(
        &self,
        email: &str,
        plaintext_password: &str,
    ) -> Result<TokenPair, AuthError> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::NotFound)?;

        let plaintext = plaintext_password.to_string();
        let stored_hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || {
            password::verify_password(&plaintext, &stored_hash)
        })
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))??;

        if !valid {
            warn!("Wrong password for user: {}", user.id);
            return Err(AuthError::InvalidCredential);
        }

        let pair = self.jwt.issue_pair(user.id)?;
        info!("User logged in: {}", user.id);
        Ok(pair)
    }

    /// Resolve a presented access token to the subject user id
    pub fn verify_access(&self, token: Option<&str>) -> Result<Uuid, AuthError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingCredential)?;
        let claims = self.jwt.validate_access(token)?;
        Ok(claims.sub)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::testing::memory_credentials;

    pub(crate) fn service() -> CredentialService {
        memory_credentials("credential-test-secret")
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let service = service();
        let user_id = service
            .register("shad", "shad@example.com", "s3cret")
            .await
            .unwrap();

        let pair = service.authenticate("Shad@Example.com", "s3cret").await.unwrap();
        assert_eq!(service.verify_access(Some(&pair.access_token)).unwrap(), user_id);

        let access = service.jwt().decode_claims(&pair.access_token).unwrap();
        let refresh = service.jwt().decode_claims(&pair.refresh_token).unwrap();
        assert_eq!(access.exp - access.iat, 900);
        assert_eq!(refresh.exp - refresh.iat, 604800);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let service = service();
        service.register("a", "dup@example.com", "pw").await.unwrap();

        let second = service.register("b", "DUP@example.com", "pw").await;
        assert!(matches!(second, Err(AuthError::DuplicateUser)));
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credential_not_not_found() {
        let service = service();
        service.register("a", "known@example.com", "right").await.unwrap();

        assert!(matches!(
            service.authenticate("known@example.com", "wrong").await,
            Err(AuthError::InvalidCredential)
        ));
        assert!(matches!(
            service.authenticate("unknown@example.com", "right").await,
            Err(AuthError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let service = service();
        assert!(matches!(
            service.register("a", "not-an-email", "pw").await,
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn test_verify_access_without_token() {
        let service = service();
        assert!(matches!(
            service.verify_access(None),
            Err(AuthError::MissingCredential)
        ));
        assert!(matches!(
            service.verify_access(Some("")),
            Err(AuthError::MissingCredential)
        ));
        assert!(matches!(
            service.verify_access(Some("garbage")),
            Err(AuthError::InvalidCredential)
        ));
    }
}
