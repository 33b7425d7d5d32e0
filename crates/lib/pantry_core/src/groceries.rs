//! Live grocery counts.
//!
//! Inventory CRUD lives outside this subsystem; tier ceilings are measured
//! against the current inventory size, not a stored counter, so only the
//! count queries exist here.

use sqlx::PgPool;

/// Count all groceries owned by a user.
pub async fn count_total(pool: &PgPool, user_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM groceries WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

/// Count groceries with expiry tracking enabled.
pub async fn count_with_expiry(pool: &PgPool, user_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM groceries WHERE user_id = $1 AND expiry_date IS NOT NULL",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}
