use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::ApiError;

pub fn hash_password(plain: &str) -> Result<String, ApiError> {
    hash(plain, DEFAULT_COST).map_err(|e| ApiError::Internal(format!("bcrypt failure: {}", e)))
}

/// Returns false both for a mismatch and for a malformed stored hash;
/// either way the caller answers 401.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    verify(plain, hashed).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_and_rejects() {
        let hashed = bcrypt::hash("s3cret", 4).unwrap();
        assert!(verify_password("s3cret", &hashed));
        assert!(!verify_password("wrong", &hashed));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
