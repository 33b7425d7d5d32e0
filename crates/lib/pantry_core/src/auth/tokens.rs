//! Refresh token rotation engine.
//!
//! Refresh tokens are single-use: a successful `rotate` revokes the
//! presented token and issues a replacement, so presenting the same secret
//! twice — or any secret from an already-rotated chain — always fails.
//! Only the SHA-256 hash of a secret is ever stored.

use chrono::{DateTime, Duration, Utc};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use super::AuthError;
use crate::models::auth::RequestContext;
use crate::uuid::uuidv7;

/// Length of a generated refresh secret in alphanumeric characters.
/// 96 chars carry well over 48 bytes of entropy.
const REFRESH_SECRET_LEN: usize = 96;

/// Generate a cryptographically random refresh secret.
fn generate_refresh_secret() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_SECRET_LEN)
        .map(char::from)
        .collect()
}

/// SHA-256 hash a refresh secret for storage.
fn hash_refresh_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issue a new refresh token for a user.
///
/// Stores the hash plus expiry and request provenance; the raw secret is
/// returned exactly once and never persisted.
pub async fn issue(
    pool: &PgPool,
    user_id: i64,
    ttl: Duration,
    ctx: &RequestContext,
) -> Result<String, AuthError> {
    let secret = generate_refresh_secret();
    let token_hash = hash_refresh_secret(&secret);
    let expires_at: DateTime<Utc> = Utc::now() + ttl;

    sqlx::query(
        "INSERT INTO refresh_tokens (id, token_hash, user_id, expires_at, user_agent, ip_address) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(uuidv7())
    .bind(&token_hash)
    .bind(user_id)
    .bind(expires_at)
    .bind(&ctx.user_agent)
    .bind(&ctx.ip_address)
    .execute(pool)
    .await?;

    Ok(secret)
}

/// Rotate a refresh token: revoke the presented one, issue a replacement.
///
/// The revocation is a single conditional UPDATE, so of N concurrent calls
/// presenting the same still-active secret exactly one claims the row and
/// succeeds; the rest fail with `InvalidRefresh`. A presented token that is
/// past its expiry is marked revoked on the spot (lazy expiry detection)
/// and the call fails.
pub async fn rotate(
    pool: &PgPool,
    presented_secret: &str,
    ttl: Duration,
    ctx: &RequestContext,
) -> Result<(i64, String), AuthError> {
    let token_hash = hash_refresh_secret(presented_secret);

    let claimed: Option<i64> = sqlx::query_scalar(
        "UPDATE refresh_tokens SET revoked_at = now() \
         WHERE token_hash = $1 AND revoked_at IS NULL AND expires_at > now() \
         RETURNING user_id",
    )
    .bind(&token_hash)
    .fetch_optional(pool)
    .await?;

    let user_id = match claimed {
        Some(id) => id,
        None => {
            // Unknown, already rotated, already revoked — or expired but not
            // yet marked. Expired rows are terminal either way; record that.
            sqlx::query(
                "UPDATE refresh_tokens SET revoked_at = now() \
                 WHERE token_hash = $1 AND revoked_at IS NULL",
            )
            .bind(&token_hash)
            .execute(pool)
            .await?;
            return Err(AuthError::InvalidRefresh);
        }
    };

    let next_secret = issue(pool, user_id, ttl, ctx).await?;
    Ok((user_id, next_secret))
}

/// Revoke a refresh token by its secret.
///
/// Idempotent: revoking an already-revoked or nonexistent token is a no-op
/// success, so logout can be retried safely.
pub async fn revoke(pool: &PgPool, presented_secret: &str) -> Result<(), AuthError> {
    let token_hash = hash_refresh_secret(presented_secret);
    sqlx::query(
        "UPDATE refresh_tokens SET revoked_at = now() \
         WHERE token_hash = $1 AND revoked_at IS NULL",
    )
    .bind(&token_hash)
    .execute(pool)
    .await?;
    Ok(())
}

/// Revoke all active refresh tokens for a user ("logout all sessions").
pub async fn revoke_all(pool: &PgPool, user_id: i64) -> Result<(), AuthError> {
    sqlx::query(
        "UPDATE refresh_tokens SET revoked_at = now() \
         WHERE user_id = $1 AND revoked_at IS NULL",
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secrets_are_long_and_alphanumeric() {
        let secret = generate_refresh_secret();
        assert_eq!(secret.len(), REFRESH_SECRET_LEN);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_secrets_are_unique() {
        assert_ne!(generate_refresh_secret(), generate_refresh_secret());
    }

    #[test]
    fn hash_is_deterministic_and_hex() {
        let h1 = hash_refresh_secret("some-secret");
        let h2 = hash_refresh_secret("some-secret");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(h1, hash_refresh_secret("other-secret"));
    }
}
