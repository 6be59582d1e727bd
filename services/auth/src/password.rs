//! Salted slow hashing for stored passwords

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};

use crate::error::AuthError;

/// Hash a plaintext password with Argon2id and a fresh random salt
///
/// Returns the PHC string (algorithm, parameters, salt and digest).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Check a plaintext password against a stored PHC string
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AuthError> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| AuthError::Hashing(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted_and_verifiable() {
        let first = hash_password("hunter2").unwrap();
        let second = hash_password("hunter2").unwrap();

        assert_ne!(first, second);
        assert!(!first.contains("hunter2"));
        assert!(first.starts_with("$argon2id$"));
        assert!(verify_password("hunter2", &first).unwrap());
        assert!(!verify_password("hunter3", &first).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(matches!(
            verify_password("hunter2", "not-a-phc-string"),
            Err(AuthError::Hashing(_))
        ));
    }
}
