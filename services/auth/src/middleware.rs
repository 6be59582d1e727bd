//! Middleware guarding routes behind the `accessToken` cookie

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{cookies, credentials::CredentialService, error::AuthError};

/// Authenticated user information
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Require a valid access token cookie
///
/// Absent token answers 401, an invalid or expired one 403. On success the
/// subject is inserted into the request extensions as [`AuthUser`].
pub async fn require_access_token(
    State(credentials): State<CredentialService>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = cookies::access_token(&jar);

    match credentials.verify_access(token.as_deref()) {
        Ok(user_id) => {
            debug!("Access granted to user: {}", user_id);
            req.extensions_mut().insert(AuthUser { id: user_id });
            next.run(req).await
        }
        Err(AuthError::MissingCredential) => {
            warn!("Request to {} without access token", req.uri().path());
            reject(StatusCode::UNAUTHORIZED, "Access Denied")
        }
        Err(e) => {
            warn!("Request to {} with bad access token: {}", req.uri().path(), e);
            reject(StatusCode::FORBIDDEN, "Invalid Token")
        }
    }
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}
