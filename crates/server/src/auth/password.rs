//! Password hashing with bcrypt.
//!
//! Hashing is CPU-bound, so both operations run on the blocking thread
//! pool rather than stalling the async runtime.

use bcrypt::DEFAULT_COST;

use super::AuthError;

/// Hash a plain-text password.
///
/// # Errors
///
/// Returns [`AuthError::Hashing`] if bcrypt fails or the blocking task
/// is cancelled.
pub async fn hash_password(password: &str) -> Result<String, AuthError> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || {
        bcrypt::hash(password, DEFAULT_COST).map_err(|e| AuthError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::Hashing(format!("task join error: {e}")))?
}

/// Verify a plain-text password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns [`AuthError::Hashing`] if the stored hash is malformed or the
/// blocking task is cancelled.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let password = password.to_string();
    let hash = hash.to_string();

    tokio::task::spawn_blocking(move || {
        bcrypt::verify(password, &hash).map_err(|e| AuthError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::Hashing(format!("task join error: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify_roundtrip() {
        let hash = hash_password("correct horse battery staple")
            .await
            .expect("hash");

        assert!(verify_password("correct horse battery staple", &hash)
            .await
            .expect("verify"));
        assert!(!verify_password("wrong password", &hash)
            .await
            .expect("verify"));
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-bcrypt-hash")
            .await
            .is_err());
    }
}
