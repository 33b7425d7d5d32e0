//! Access token issue and verification.
//!
//! Access tokens are self-contained HS256 JWTs; every request is verifiable
//! without a storage round trip. The refresh-token store is the only
//! stateful trust anchor.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::AuthError;
use crate::models::auth::AccessClaims;

/// Generate a signed JWT access token (HS256).
pub fn generate_access_token(
    user_id: i64,
    email: &str,
    role: &str,
    ttl_secs: i64,
    secret: &[u8],
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = AccessClaims {
        sub: user_id,
        email: email.to_string(),
        role: role.to_string(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
}

/// Verify a JWT access token, returning the claims on success.
///
/// Fails closed: a bad signature and an elapsed expiry are both `None`.
pub fn verify_access_token(token: &str, secret: &[u8]) -> Option<AccessClaims> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<AccessClaims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"unit-test-secret";

    #[test]
    fn issue_then_verify_roundtrip() {
        let token = generate_access_token(42, "a@b.test", "user", 900, SECRET).expect("encode");
        let claims = verify_access_token(&token, SECRET).expect("valid token");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "a@b.test");
        assert_eq!(claims.role, "user");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(1, "a@b.test", "user", 900, SECRET).expect("encode");
        assert!(verify_access_token(&token, b"other-secret").is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default 60s validation leeway.
        let token = generate_access_token(1, "a@b.test", "user", -120, SECRET).expect("encode");
        assert!(verify_access_token(&token, SECRET).is_none());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(verify_access_token("not-a-jwt", SECRET).is_none());
    }
}
