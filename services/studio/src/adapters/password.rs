//! services/studio/src/adapters/password.rs
//!
//! Salted Argon2 password hashing, implementing the `CredentialHasher` port.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use echoverse_core::ports::{CredentialHasher, PortError, PortResult};

/// Stores passwords as Argon2 PHC strings with a fresh random salt each time.
#[derive(Clone, Debug, Default)]
pub struct Argon2Credentials;

impl CredentialHasher for Argon2Credentials {
    fn hash_password(&self, password: &str) -> PortResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {}", e)))?
            .to_string();
        Ok(password_hash)
    }

    fn verify_password(&self, password: &str, stored: &str) -> PortResult<bool> {
        let parsed_hash = PasswordHash::new(stored)
            .map_err(|e| PortError::Unexpected(format!("Failed to parse password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_only_the_original_password() {
        let credentials = Argon2Credentials;
        let stored = credentials.hash_password("pw1").unwrap();

        assert!(stored.starts_with("$argon2"));
        assert!(!stored.contains("pw1"));
        assert!(credentials.verify_password("pw1", &stored).unwrap());
        assert!(!credentials.verify_password("pw2", &stored).unwrap());
        assert!(!credentials.verify_password("", &stored).unwrap());
    }

    #[test]
    fn every_hash_gets_its_own_salt() {
        let credentials = Argon2Credentials;
        let first = credentials.hash_password("pw1").unwrap();
        let second = credentials.hash_password("pw1").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn plaintext_credentials_are_not_accepted() {
        let credentials = Argon2Credentials;
        assert!(matches!(
            credentials.verify_password("pw1", "pw1"),
            Err(PortError::Unexpected(_))
        ));
    }
}
