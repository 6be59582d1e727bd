//! User repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::error::AuthError;
use crate::models::{NewUser, User};

/// Persistence seam for user records
///
/// Emails are unique at the storage level; `insert` reports a collision as
/// [`AuthError::DuplicateUser`].
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user
    async fn insert(&self, new_user: &NewUser) -> Result<User, AuthError>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn insert(&self, new_user: &NewUser) -> Result<User, AuthError> {
        info!("Creating new user: {}", new_user.email);

        let now = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id, username, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AuthError::DuplicateUser,
            other => AuthError::Database(other),
        })?;

        Ok(user_from_row(&row))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }
}
