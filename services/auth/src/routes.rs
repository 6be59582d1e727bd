//! Authentication routes, mounted under `/api/auth`

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::{cookies, credentials::CredentialService, error::AuthError};

/// Request for user registration
#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Create the router for the authentication endpoints
pub fn create_router<S>(credentials: CredentialService) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(credentials)
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

fn failure(text: &str, error: impl std::fmt::Display) -> Response {
    error!("{}: {}", text, error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": text, "error": error.to_string() })),
    )
        .into_response()
}

/// User signup endpoint
pub async fn signup(
    State(credentials): State<CredentialService>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure("Signup failed", rejection.body_text()),
    };
    info!("Signup attempt for: {}", payload.email);

    match credentials
        .register(&payload.username, &payload.email, &payload.password)
        .await
    {
        Ok(_) => message(StatusCode::CREATED, "User registered successfully"),
        Err(e @ AuthError::Validation(_)) => e.into_response(),
        Err(e) => failure("Signup failed", e),
    }
}

/// User login endpoint
///
/// Sets the `accessToken` and `refreshToken` cookies on success.
pub async fn login(
    State(credentials): State<CredentialService>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure("Login failed", rejection.body_text()),
    };
    info!("Login attempt for: {}", payload.email);

    match credentials
        .authenticate(&payload.email, &payload.password)
        .await
    {
        Ok(pair) => (
            StatusCode::OK,
            cookies::with_session_cookies(jar, pair),
            Json(json!({ "message": "Logged in successfully" })),
        )
            .into_response(),
        Err(AuthError::NotFound) => message(StatusCode::NOT_FOUND, "User not found"),
        Err(AuthError::InvalidCredential) => message(StatusCode::UNAUTHORIZED, "Wrong password"),
        Err(e) => failure("Login failed", e),
    }
}

/// Logout endpoint
///
/// Tokens are not revoked; the client is told to drop both cookies.
pub async fn logout(jar: CookieJar) -> Response {
    info!("Logout request");

    (
        StatusCode::OK,
        cookies::without_session_cookies(jar),
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response()
}
