//! In-memory credential store for tests in this and dependent crates

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::config::JwtConfig;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::credentials::CredentialService;
use crate::error::AuthError;
use crate::jwt::JwtService;
use crate::models::{NewUser, User};
use crate::repositories::UserStore;

/// User store keyed by email
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, new_user: &NewUser) -> Result<User, AuthError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(AuthError::DuplicateUser);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }
}

/// Credential service over an empty [`MemoryUserStore`]
pub fn memory_credentials(secret: &str) -> CredentialService {
    let jwt = JwtService::new(&JwtConfig {
        secret: secret.to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604800,
    });
    CredentialService::new(Arc::new(MemoryUserStore::default()), jwt)
}
