//! Token authentication for the API.
//!
//! Every protected endpoint expects `Authorization: Bearer <jwt>`. The
//! token carries the user id and role; handlers receive them through the
//! [`CurrentUser`] and [`RequireAdmin`] extractors.

mod extract;
mod password;

pub use extract::{CurrentUser, RequireAdmin};
pub use password::{hash_password, verify_password};

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crewdesk_core::{Role, UserId};

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password pair did not match a user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// No bearer token on the request.
    #[error("missing bearer token")]
    MissingToken,

    /// Token failed signature or claims validation.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token could not be signed.
    #[error("token encoding failed: {0}")]
    TokenCreation(String),

    /// Password hashing failed.
    #[error("hashing error: {0}")]
    Hashing(String),
}

/// JWT claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: UserId,
    /// The user's role at issue time.
    pub role: Role,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

/// Signing and verification keys derived from the configured secret.
pub struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    /// Build keys from the raw HMAC secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a signed access token for a user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenCreation`] if token encoding fails.
    pub fn issue(&self, user_id: UserId, role: Role, ttl_hours: u64) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            role,
            iat: now,
            exp: now + i64::try_from(ttl_hours * 3600).unwrap_or(i64::MAX),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if the signature is wrong or
    /// the token has expired.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> Keys {
        Keys::new(b"kXf91mQz7vLp3Wd8Rt2Yb6Ng4Hs0Jc5A")
    }

    #[test]
    fn issued_token_verifies() {
        let keys = keys();
        let user_id = UserId::random();

        let token = keys.issue(user_id, Role::Employee, 1).expect("issue");
        let claims = keys.verify(&token).expect("verify");

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Employee);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = keys()
            .issue(UserId::random(), Role::Admin, 1)
            .expect("issue");

        let other = Keys::new(b"A5cJ0sH4gN6bY2tR8dW3pL7zQm19fXk0");
        assert!(matches!(
            other.verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            keys().verify("not-a-token"),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
