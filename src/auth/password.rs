/// Password Hashing and Verification
///
/// bcrypt with a random per-hash salt embedded in the output. Plaintext
/// passwords never leave this module's callers' stack frames.

use bcrypt::{hash, verify, DEFAULT_COST};
use lazy_static::lazy_static;

use crate::error::CryptoError;

lazy_static! {
    /// Verified against when a login names an unknown email, so that path
    /// costs about as much as a wrong password.
    static ref DUMMY_HASH: String = hash("chirpy-dummy-password", DEFAULT_COST).unwrap_or_default();
}

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `CryptoError::Hashing` if bcrypt fails
pub fn hash_password(password: &str) -> Result<String, CryptoError> {
    hash(password, DEFAULT_COST).map_err(|e| CryptoError::Hashing(e.to_string()))
}

/// Verify a password against its hash
///
/// Returns `Ok(false)` on mismatch.
///
/// # Errors
/// Returns `CryptoError::Hashing` only if `hash` is not a valid bcrypt hash
pub fn verify_password(hash: &str, password: &str) -> Result<bool, CryptoError> {
    verify(password, hash).map_err(|e| CryptoError::Hashing(e.to_string()))
}

/// Burn one bcrypt verification without looking at the result
pub(crate) fn verify_dummy(password: &str) {
    let _ = verify(password, DUMMY_HASH.as_str());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let password = "pw123";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_hash_is_salted() {
        let first = hash_password("pw123").expect("Failed to hash password");
        let second = hash_password("pw123").expect("Failed to hash password");

        assert_ne!(first, second);
        assert!(verify_password(&first, "pw123").unwrap());
        assert!(verify_password(&second, "pw123").unwrap());
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("ValidPassword123").expect("Failed to hash password");

        assert!(verify_password(&hash, "ValidPassword123").expect("Failed to verify password"));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("ValidPassword123").expect("Failed to hash password");

        let is_valid = verify_password(&hash, "WrongPassword123").expect("Failed to verify password");
        assert!(!is_valid);
    }

    #[test]
    fn test_verify_malformed_hash() {
        let result = verify_password("not-a-bcrypt-hash", "pw123");
        assert!(matches!(result, Err(CryptoError::Hashing(_))));
    }

    #[test]
    fn test_dummy_hash_is_usable() {
        assert!(DUMMY_HASH.starts_with("$2"));
        verify_dummy("anything");
    }
}
