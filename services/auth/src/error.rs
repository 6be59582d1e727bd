//! Error type for the credential store and session issuer

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// No session token was presented
    #[error("Access Denied")]
    MissingCredential,

    /// Wrong password, bad signature, wrong token kind, or expired token
    #[error("Invalid credential")]
    InvalidCredential,

    /// No user is registered under the given email
    #[error("User not found")]
    NotFound,

    /// The email is already registered
    #[error("A user with this email already exists")]
    DuplicateUser,

    /// Signup input rejected before touching storage
    #[error("{0}")]
    Validation(String),

    /// Password hashing failed
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Token signing failed
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Underlying storage failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuthError {
    /// HTTP status this error maps to at the request boundary
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredential => StatusCode::UNAUTHORIZED,
            AuthError::InvalidCredential => StatusCode::UNAUTHORIZED,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::DuplicateUser
            | AuthError::Hashing(_)
            | AuthError::Token(_)
            | AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            error!("Authentication service error: {}", self);
            "Internal server error".to_string()
        } else {
            warn!("Authentication rejected: {}", self);
            self.to_string()
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
