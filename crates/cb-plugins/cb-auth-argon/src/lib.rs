//! # cb-auth-argon
//!
//! Argon2-based implementation of `CredentialHasher`.
//! Hashes are PHC strings carrying their own salt and parameters.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use cb_core::traits::CredentialHasher;

#[derive(Default)]
pub struct ArgonHasher {
    argon: Argon2<'static>,
}

impl ArgonHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for ArgonHasher {
    /// Fresh random salt per call, so equal passwords hash differently.
    fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("argon2 hashing failed: {e}"))?;
        Ok(hash.to_string())
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        self.argon
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hasher = ArgonHasher::new();
        let hash = hasher.hash_password("pw1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify_password("pw1", &hash));
        assert!(!hasher.verify_password("pw2", &hash));
    }

    #[test]
    fn salts_differ_between_calls() {
        let hasher = ArgonHasher::new();
        let a = hasher.hash_password("same").unwrap();
        let b = hasher.hash_password("same").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify_password("same", &b));
    }

    #[test]
    fn garbage_hash_never_matches() {
        let hasher = ArgonHasher::new();
        assert!(!hasher.verify_password("pw", "not-a-phc-string"));
        assert!(!hasher.verify_password("", ""));
    }
}
