//! JWT service for token generation and validation
//!
//! Tokens are stateless: nothing is persisted server-side. A token is valid
//! when its HS256 signature checks out against the configured secret, it is
//! of the expected kind, and the current time is before its `exp`. Expiry is
//! checked against an explicit clock value so verification stays a pure
//! function of `(token, secret, now)`.

use std::time::{SystemTime, UNIX_EPOCH};

use common::config::JwtConfig;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::AuthError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

/// The pair of tokens handed out at login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires
    pub access_expires_in: u64,
    /// Seconds until the refresh token expires
    pub refresh_expires_in: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_expiry: u64,
    refresh_token_expiry: u64,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: &JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        // Expiry is checked by hand against the caller's clock
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            access_token_expiry: config.access_token_expiry,
            refresh_token_expiry: config.refresh_token_expiry,
        }
    }

    /// Issue an access/refresh pair for `user_id`, stamped with the current time
    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        self.issue_pair_at(user_id, unix_now())
    }

    /// Issue an access/refresh pair as if the current time were `now`
    pub fn issue_pair_at(&self, user_id: Uuid, now: u64) -> Result<TokenPair, AuthError> {
        let access_token = self.sign(user_id, TokenType::Access, now, self.access_token_expiry)?;
        let refresh_token =
            self.sign(user_id, TokenType::Refresh, now, self.refresh_token_expiry)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_in: self.access_token_expiry,
            refresh_expires_in: self.refresh_token_expiry,
        })
    }

    fn sign(
        &self,
        user_id: Uuid,
        token_type: TokenType,
        now: u64,
        ttl: u64,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + ttl,
            token_type,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify signature and kind without looking at expiry
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                debug!("Token rejected: {}", e);
                AuthError::InvalidCredential
            })?;
        Ok(token_data.claims)
    }

    /// Validate a token of the given kind at time `now` and return its claims
    pub fn validate_at(
        &self,
        token: &str,
        expected: TokenType,
        now: u64,
    ) -> Result<Claims, AuthError> {
        let claims = self.decode_claims(token)?;

        if claims.token_type != expected {
            debug!(
                "Token rejected: expected {:?}, got {:?}",
                expected, claims.token_type
            );
            return Err(AuthError::InvalidCredential);
        }

        if now >= claims.exp {
            debug!("Token rejected: expired at {}", claims.exp);
            return Err(AuthError::InvalidCredential);
        }

        Ok(claims)
    }

    /// Validate an access token against the current time
    pub fn validate_access(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_at(token, TokenType::Access, unix_now())
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.access_token_expiry
    }

    /// Get the refresh token expiry time
    pub fn refresh_token_expiry(&self) -> u64 {
        self.refresh_token_expiry
    }
}

/// Seconds since the Unix epoch
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> JwtService {
        JwtService::new(&JwtConfig {
            secret: secret.to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
        })
    }

    #[test]
    fn test_pair_expiries_are_exact() {
        let jwt = service("unit-test-secret");
        let user_id = Uuid::new_v4();
        let pair = jwt.issue_pair_at(user_id, 1_700_000_000).unwrap();

        let access = jwt.decode_claims(&pair.access_token).unwrap();
        let refresh = jwt.decode_claims(&pair.refresh_token).unwrap();

        assert_eq!(access.sub, user_id);
        assert_eq!(access.token_type, TokenType::Access);
        assert_eq!(access.exp - access.iat, 900);
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert_eq!(refresh.exp - refresh.iat, 604800);
        assert_eq!(pair.access_expires_in, 900);
        assert_eq!(pair.refresh_expires_in, 604800);
    }

    #[test]
    fn test_access_token_expires_after_fifteen_minutes() {
        let jwt = service("unit-test-secret");
        let issued = 1_700_000_000;
        let pair = jwt.issue_pair_at(Uuid::new_v4(), issued).unwrap();

        assert!(jwt.validate_at(&pair.access_token, TokenType::Access, issued + 899).is_ok());
        assert!(matches!(
            jwt.validate_at(&pair.access_token, TokenType::Access, issued + 900),
            Err(AuthError::InvalidCredential)
        ));
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let jwt = service("unit-test-secret");
        let pair = jwt.issue_pair(Uuid::new_v4()).unwrap();

        assert!(matches!(
            jwt.validate_access(&pair.refresh_token),
            Err(AuthError::InvalidCredential)
        ));
        assert!(jwt.validate_access(&pair.access_token).is_ok());
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let issuer = service("one-secret");
        let verifier = service("another-secret");
        let pair = issuer.issue_pair(Uuid::new_v4()).unwrap();

        assert!(matches!(
            verifier.validate_access(&pair.access_token),
            Err(AuthError::InvalidCredential)
        ));
        assert!(matches!(
            verifier.validate_access("not-a-jwt"),
            Err(AuthError::InvalidCredential)
        ));
    }
}
