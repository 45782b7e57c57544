//! bcrypt password hashing.
//!
//! # Invariants
//! - Plaintext passwords and hashes are never logged.
//! - Passwords past bcrypt's input limit are refused, never truncated.
//! - A malformed stored hash verifies as `false`, not as an error.

use bcrypt::BcryptError;

pub use bcrypt::DEFAULT_COST;

/// Lowest cost bcrypt accepts; intended for tests.
pub const MIN_COST: u32 = 4;

pub fn hash_password(password: &str, cost: u32) -> Result<String, BcryptError> {
    bcrypt::non_truncating_hash(password.as_bytes(), cost)
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::non_truncating_verify(password.as_bytes(), password_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password, MIN_COST};

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("hunter2", MIN_COST).unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn malformed_hash_is_rejected() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn overlong_password_is_not_truncated() {
        let long = "p".repeat(73);
        assert!(hash_password(&long, MIN_COST).is_err());

        let hash = hash_password(&long[..72], MIN_COST).unwrap();
        assert!(!verify_password(&long, &hash));
    }
}
