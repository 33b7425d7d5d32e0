//! Integration tests — refresh token rotation against ephemeral PostgreSQL.

use chrono::Duration;
use sqlx::PgPool;

use pantry_core::auth::AuthError;
use pantry_core::auth::tokens;
use pantry_core::db::LocalDbManager;
use pantry_core::models::auth::RequestContext;

const REFRESH_TTL_SECS: i64 = 30 * 24 * 3600;

async fn setup() -> (LocalDbManager, PgPool) {
    let mut db = LocalDbManager::ephemeral()
        .await
        .expect("LocalDbManager::ephemeral");
    db.setup().await.expect("db setup");
    db.start().await.expect("db start");

    let pool = PgPool::connect(&db.connection_url())
        .await
        .expect("connect to ephemeral PG");
    pantry_core::migrate::migrate(&pool).await.expect("migrate");

    (db, pool)
}

async fn create_test_user(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO users (email, name, password_hash) VALUES ($1, 'Test', 'x') RETURNING id",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .expect("create test user")
}

fn ttl() -> Duration {
    Duration::seconds(REFRESH_TTL_SECS)
}

#[tokio::test]
async fn rotation_is_single_use() {
    let (mut db, pool) = setup().await;
    let user_id = create_test_user(&pool, "rotate@t.test").await;
    let ctx = RequestContext::default();

    let r1 = tokens::issue(&pool, user_id, ttl(), &ctx).await.expect("issue");

    // First rotation succeeds and yields a different secret.
    let (rotated_user, r2) = tokens::rotate(&pool, &r1, ttl(), &ctx)
        .await
        .expect("first rotate");
    assert_eq!(rotated_user, user_id);
    assert_ne!(r1, r2);

    // Replaying the consumed secret always fails.
    let replay = tokens::rotate(&pool, &r1, ttl(), &ctx).await;
    assert!(matches!(replay, Err(AuthError::InvalidRefresh)));

    // The descendant is still good.
    let (_, r3) = tokens::rotate(&pool, &r2, ttl(), &ctx)
        .await
        .expect("rotate descendant");
    assert_ne!(r2, r3);

    db.stop().await.expect("db stop");
}

#[tokio::test]
async fn revocation_is_idempotent_and_terminal() {
    let (mut db, pool) = setup().await;
    let user_id = create_test_user(&pool, "revoke@t.test").await;
    let ctx = RequestContext::default();

    let r1 = tokens::issue(&pool, user_id, ttl(), &ctx).await.expect("issue");

    // Logout twice: both succeed (at-least-once delivery).
    tokens::revoke(&pool, &r1).await.expect("first revoke");
    tokens::revoke(&pool, &r1).await.expect("second revoke");

    // A never-issued secret is also a no-op success.
    tokens::revoke(&pool, "never-issued-secret").await.expect("revoke unknown");

    // Revoked means gone.
    let rotate = tokens::rotate(&pool, &r1, ttl(), &ctx).await;
    assert!(matches!(rotate, Err(AuthError::InvalidRefresh)));

    db.stop().await.expect("db stop");
}

#[tokio::test]
async fn expired_token_is_lazily_revoked() {
    let (mut db, pool) = setup().await;
    let user_id = create_test_user(&pool, "expired@t.test").await;
    let ctx = RequestContext::default();

    // Already past its expiry at issue time.
    let r1 = tokens::issue(&pool, user_id, Duration::seconds(-60), &ctx)
        .await
        .expect("issue expired");

    let rotate = tokens::rotate(&pool, &r1, ttl(), &ctx).await;
    assert!(matches!(rotate, Err(AuthError::InvalidRefresh)));

    // The expiry was detected and recorded.
    let unrevoked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM refresh_tokens WHERE user_id = $1 AND revoked_at IS NULL",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .expect("count");
    assert_eq!(unrevoked, 0);

    db.stop().await.expect("db stop");
}

#[tokio::test]
async fn concurrent_rotation_has_exactly_one_winner() {
    let (mut db, pool) = setup().await;
    let user_id = create_test_user(&pool, "race@t.test").await;
    let ctx = RequestContext::default();

    let r1 = tokens::issue(&pool, user_id, ttl(), &ctx).await.expect("issue");

    let (a, b) = tokio::join!(
        tokens::rotate(&pool, &r1, ttl(), &ctx),
        tokens::rotate(&pool, &r1, ttl(), &ctx),
    );

    let winners = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(winners, 1, "exactly one concurrent rotate may win");

    db.stop().await.expect("db stop");
}

#[tokio::test]
async fn revoke_all_ends_every_session() {
    let (mut db, pool) = setup().await;
    let user_id = create_test_user(&pool, "all@t.test").await;
    let ctx = RequestContext::default();

    let r1 = tokens::issue(&pool, user_id, ttl(), &ctx).await.expect("issue");
    let r2 = tokens::issue(&pool, user_id, ttl(), &ctx).await.expect("issue");

    tokens::revoke_all(&pool, user_id).await.expect("revoke all");

    assert!(tokens::rotate(&pool, &r1, ttl(), &ctx).await.is_err());
    assert!(tokens::rotate(&pool, &r2, ttl(), &ctx).await.is_err());

    db.stop().await.expect("db stop");
}
