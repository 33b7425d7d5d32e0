//! Credential-store queries.

use sqlx::PgPool;

use super::AuthError;
use super::password::hash_password;
use crate::models::auth::User;

/// Email address of the fixed demo identity used in bypass mode.
pub const DEMO_EMAIL: &str = "demo@pantry.local";

/// Fetch a full user record by email.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Fetch a user's id and password verifier by email, for login.
pub async fn find_credentials_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<(i64, String)>, AuthError> {
    let row = sqlx::query_as::<_, (i64, String)>(
        "SELECT id, password_hash FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch a full user record by id.
pub async fn get_user_by_id(pool: &PgPool, user_id: i64) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Create a new user, returning the stored record.
///
/// A concurrent duplicate registration loses the unique-index race and maps
/// to `DuplicateEmail` rather than a bare database error.
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    name: &str,
    password_hash: &str,
    role: &str,
) -> Result<User, AuthError> {
    let row = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, name, password_hash, role) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::DuplicateEmail,
        _ => AuthError::DbError(e),
    })?;
    Ok(row)
}

/// Check whether an email is already registered.
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AuthError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Count total users.
pub async fn user_count(pool: &PgPool) -> Result<i64, AuthError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Create the demo identity if it does not exist yet, and return it.
///
/// Called once at process startup when bypass mode is enabled, so concurrent
/// first requests never race to create it. The stored password is random and
/// never disclosed — the demo identity cannot log in through `/auth/login`.
pub async fn ensure_demo_user(pool: &PgPool) -> Result<User, AuthError> {
    use rand::distr::Alphanumeric;
    use rand::{Rng, rng};

    let unusable_password: String = rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let password_hash = hash_password(&unusable_password)?;

    sqlx::query(
        "INSERT INTO users (email, name, password_hash) VALUES ($1, $2, $3) \
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(DEMO_EMAIL)
    .bind("Demo")
    .bind(&password_hash)
    .execute(pool)
    .await?;

    find_user_by_email(pool, DEMO_EMAIL)
        .await?
        .ok_or_else(|| AuthError::Internal("demo user missing after insert".into()))
}
