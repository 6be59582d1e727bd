//! Credential store and session issuer
//!
//! Users register with a username, email and password; a successful login
//! issues a signed access/refresh token pair delivered as HTTP-only cookies.
//! [`middleware::require_access_token`] guards any route behind the access
//! cookie.

pub mod cookies;
pub mod credentials;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod validation;

pub use credentials::CredentialService;
pub use error::AuthError;
pub use jwt::{JwtService, TokenPair};
pub use middleware::{AuthUser, require_access_token};
pub use repositories::{UserRepository, UserStore};
