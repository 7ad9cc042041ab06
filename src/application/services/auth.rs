use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};

pub fn hash_password(password: &str) -> ApiResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
}

/// Constant-time comparison against a stored digest. A digest that fails to
/// parse counts as a mismatch rather than an error, so login failures stay
/// indistinguishable to the caller.
pub fn verify_password(password: &str, digest: &str) -> bool {
    bcrypt::verify(password, digest).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let digest = hash_password("correct horse").unwrap();
        assert!(digest.starts_with("$2"));
        assert!(verify_password("correct horse", &digest));
        assert!(!verify_password("wrong horse", &digest));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let a = hash_password("secret").unwrap();
        let b = hash_password("secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_digest_is_a_mismatch() {
        assert!(!verify_password("secret", "not-a-bcrypt-digest"));
    }
}
