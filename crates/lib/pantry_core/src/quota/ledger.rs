//! Quota ledger — lazy resets plus atomic conditional consumption.
//!
//! Check-then-increment is a single conditional UPDATE, so concurrent
//! consumers for the same user cannot push a counter past its limit:
//! zero rows affected *is* the exceeded path.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use sqlx::PgPool;

use super::QuotaError;
use super::tiers;
use crate::auth::queries::get_user_by_id;
use crate::models::quota::{LimitKind, RollingQuotaKind};

/// First calendar day of the month after `now`, midnight UTC.
pub fn first_of_next_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    // Midnight on the 1st always exists in UTC.
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap()
}

/// Apply the rolling and monthly lazy resets for a user.
///
/// Each reset is a conditional UPDATE guarded by its own timestamp, so
/// concurrent callers reset at most once. An account idle across several
/// intervals still gets exactly one reset, anchored to the moment of this
/// call — there is no catch-up.
pub async fn apply_lazy_resets(
    pool: &PgPool,
    user_id: i64,
    reset_interval: Duration,
) -> Result<(), QuotaError> {
    let now = Utc::now();

    sqlx::query(
        "UPDATE users SET llm_tokens_used = 0, recipe_calls_used = 0, quota_reset_at = $2 \
         WHERE id = $1 AND (quota_reset_at IS NULL OR quota_reset_at <= $3)",
    )
    .bind(user_id)
    .bind(now + reset_interval)
    .bind(now)
    .execute(pool)
    .await?;

    sqlx::query(
        "UPDATE users SET cache_recipe_suggestions_used = 0, chat_messages_used = 0, \
             cache_recipe_search_via_chat_used = 0, monthly_limit_reset_at = $2 \
         WHERE id = $1 AND (monthly_limit_reset_at IS NULL OR monthly_limit_reset_at <= $3)",
    )
    .bind(user_id)
    .bind(first_of_next_month(now))
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Consume `amount` units of a rolling quota, or fail leaving state
/// unchanged.
///
/// The comparison and the increment are one statement: of several
/// concurrent contenders racing the last units, exactly the ones that fit
/// under the limit win. A limit of -1 bypasses the comparison.
pub async fn consume_rolling(
    pool: &PgPool,
    user_id: i64,
    kind: RollingQuotaKind,
    amount: i64,
    reset_interval: Duration,
) -> Result<(), QuotaError> {
    apply_lazy_resets(pool, user_id, reset_interval).await?;

    let sql = match kind {
        RollingQuotaKind::LlmTokens => {
            "UPDATE users SET llm_tokens_used = llm_tokens_used + $2 \
             WHERE id = $1 AND (quota_llm_tokens = -1 OR llm_tokens_used + $2 <= quota_llm_tokens)"
        }
        RollingQuotaKind::RecipeCalls => {
            "UPDATE users SET recipe_calls_used = recipe_calls_used + $2 \
             WHERE id = $1 AND (quota_recipe_calls = -1 OR recipe_calls_used + $2 <= quota_recipe_calls)"
        }
    };

    let result = sqlx::query(sql)
        .bind(user_id)
        .bind(amount)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        return Ok(());
    }

    // Zero rows: either the user is gone or the quota is exhausted.
    // Re-read the limit only to build the error payload.
    let limit_sql = match kind {
        RollingQuotaKind::LlmTokens => "SELECT quota_llm_tokens FROM users WHERE id = $1",
        RollingQuotaKind::RecipeCalls => "SELECT quota_recipe_calls FROM users WHERE id = $1",
    };
    let limit: Option<i64> = sqlx::query_scalar(limit_sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    match limit {
        None => Err(QuotaError::UserNotFound),
        Some(limit) => Err(QuotaError::Exceeded { kind, limit }),
    }
}

/// Check a monthly/tier limit and, for the counter kinds, consume one unit.
///
/// The three counter kinds increment atomically against the resolved limit.
/// The two grocery kinds compare the supplied live inventory count against
/// the ceiling and mutate nothing — the row insert belongs to the inventory
/// CRUD, which only proceeds when this check passes.
pub async fn check_and_consume_monthly(
    pool: &PgPool,
    user_id: i64,
    kind: LimitKind,
    live_count: Option<i64>,
    reset_interval: Duration,
) -> Result<(), QuotaError> {
    apply_lazy_resets(pool, user_id, reset_interval).await?;

    let user = get_user_by_id(pool, user_id)
        .await
        .map_err(|e| match e {
            crate::auth::AuthError::DbError(e) => QuotaError::DbError(e),
            _ => QuotaError::UserNotFound,
        })?
        .ok_or(QuotaError::UserNotFound)?;

    let resolved = tiers::resolve(&user, kind, live_count);

    if kind.is_inventory() {
        if resolved.is_exhausted() {
            return Err(QuotaError::MonthlyExceeded {
                kind,
                limit: resolved.limit,
            });
        }
        return Ok(());
    }

    // Counter kinds: the resolved limit is passed back in because the
    // stored field may be NULL (free-tier default applied in Rust).
    let sql = match kind {
        LimitKind::CacheRecipeSuggestions => {
            "UPDATE users SET cache_recipe_suggestions_used = cache_recipe_suggestions_used + 1 \
             WHERE id = $1 AND ($2 = -1 OR cache_recipe_suggestions_used < $2)"
        }
        LimitKind::ChatMessages => {
            "UPDATE users SET chat_messages_used = chat_messages_used + 1 \
             WHERE id = $1 AND ($2 = -1 OR chat_messages_used < $2)"
        }
        LimitKind::CacheRecipeSearchViaChat => {
            "UPDATE users SET cache_recipe_search_via_chat_used = cache_recipe_search_via_chat_used + 1 \
             WHERE id = $1 AND ($2 = -1 OR cache_recipe_search_via_chat_used < $2)"
        }
        LimitKind::GroceriesTotal | LimitKind::GroceriesWithExpiry => unreachable!(),
    };

    let result = sqlx::query(sql)
        .bind(user_id)
        .bind(resolved.limit)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(QuotaError::MonthlyExceeded {
            kind,
            limit: resolved.limit,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quota::UNLIMITED;

    #[test]
    fn next_month_mid_year() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 14, 30, 0).unwrap();
        let next = first_of_next_month(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn next_month_rolls_over_december() {
        let now = Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap();
        let next = first_of_next_month(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn next_month_from_first_day_is_still_next_month() {
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let next = first_of_next_month(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn unlimited_constant_matches_sql_sentinel() {
        // The conditional UPDATEs hard-code -1; keep the constant in sync.
        assert_eq!(UNLIMITED, -1);
    }
}
