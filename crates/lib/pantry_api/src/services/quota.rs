//! Quota service — bypass-aware wrappers over `pantry_core::quota`.
//!
//! Metered handlers (LLM proxying, recipe lookups, chat) call these before
//! doing the work they meter. Denials are expected, frequent events and are
//! logged at info, never as errors.

use tracing::info;

use pantry_core::groceries;
use pantry_core::models::quota::{LimitKind, ResolvedLimit, RollingQuotaKind, UNLIMITED};
use pantry_core::quota::{QuotaError, ledger, tiers};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{InventoryLimits, LimitsResponse, MonthlyLimits, RollingLimits};

impl From<QuotaError> for AppError {
    fn from(e: QuotaError) -> Self {
        match e {
            QuotaError::Exceeded { kind, limit } => AppError::QuotaExceeded { kind, limit },
            QuotaError::MonthlyExceeded { kind, limit } => {
                AppError::MonthlyLimitExceeded { kind, limit }
            }
            QuotaError::UserNotFound => AppError::NotFound("User not found".into()),
            QuotaError::DbError(e) => AppError::from(e),
        }
    }
}

/// Consume units of a rolling quota. In bypass mode this is a no-op success.
pub async fn consume_rolling(
    state: &AppState,
    user_id: i64,
    kind: RollingQuotaKind,
    amount: i64,
) -> AppResult<()> {
    if state.config.auth_bypass {
        return Ok(());
    }

    match ledger::consume_rolling(
        &state.pool,
        user_id,
        kind,
        amount,
        state.config.reset_interval(),
    )
    .await
    {
        Ok(()) => Ok(()),
        Err(e @ QuotaError::Exceeded { .. }) => {
            info!(user_id, kind = kind.as_str(), amount, "rolling quota denied");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Check a monthly/tier limit and consume one unit where a counter exists.
/// Live inventory counts are fetched here for the two grocery kinds. In
/// bypass mode this is a no-op success.
pub async fn check_and_consume_monthly(
    state: &AppState,
    user_id: i64,
    kind: LimitKind,
) -> AppResult<()> {
    if state.config.auth_bypass {
        return Ok(());
    }

    let live_count = match kind {
        LimitKind::GroceriesTotal => Some(groceries::count_total(&state.pool, user_id).await?),
        LimitKind::GroceriesWithExpiry => {
            Some(groceries::count_with_expiry(&state.pool, user_id).await?)
        }
        _ => None,
    };

    match ledger::check_and_consume_monthly(
        &state.pool,
        user_id,
        kind,
        live_count,
        state.config.reset_interval(),
    )
    .await
    {
        Ok(()) => Ok(()),
        Err(e @ QuotaError::MonthlyExceeded { .. }) => {
            info!(user_id, kind = kind.as_str(), "monthly limit denied");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Build the resolved-limits snapshot for `GET /user/limits`.
///
/// In bypass mode everything resolves to the unlimited sentinel without
/// touching storage.
pub async fn limits_snapshot(state: &AppState, user_id: i64) -> AppResult<LimitsResponse> {
    if state.config.auth_bypass {
        return Ok(unlimited_snapshot());
    }

    let user = pantry_core::auth::queries::get_user_by_id(&state.pool, user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let groceries_total = groceries::count_total(&state.pool, user_id).await?;
    let groceries_with_expiry = groceries::count_with_expiry(&state.pool, user_id).await?;

    Ok(LimitsResponse {
        rolling: RollingLimits {
            llm_tokens: ResolvedLimit {
                limit: user.quota_llm_tokens,
                used: user.llm_tokens_used,
            },
            recipe_calls: ResolvedLimit {
                limit: user.quota_recipe_calls,
                used: user.recipe_calls_used,
            },
            resets_at: user.quota_reset_at,
        },
        monthly: MonthlyLimits {
            cache_recipe_suggestions: tiers::resolve(
                &user,
                LimitKind::CacheRecipeSuggestions,
                None,
            ),
            chat_messages: tiers::resolve(&user, LimitKind::ChatMessages, None),
            cache_recipe_search_via_chat: tiers::resolve(
                &user,
                LimitKind::CacheRecipeSearchViaChat,
                None,
            ),
            resets_at: user.monthly_limit_reset_at,
        },
        inventory: InventoryLimits {
            groceries_total: tiers::resolve(
                &user,
                LimitKind::GroceriesTotal,
                Some(groceries_total),
            ),
            groceries_with_expiry: tiers::resolve(
                &user,
                LimitKind::GroceriesWithExpiry,
                Some(groceries_with_expiry),
            ),
        },
        notifications_enabled: user.notifications_enabled,
        has_priority_support: user.has_priority_support,
    })
}

fn unlimited_snapshot() -> LimitsResponse {
    let unlimited = || ResolvedLimit {
        limit: UNLIMITED,
        used: 0,
    };
    LimitsResponse {
        rolling: RollingLimits {
            llm_tokens: unlimited(),
            recipe_calls: unlimited(),
            resets_at: None,
        },
        monthly: MonthlyLimits {
            cache_recipe_suggestions: unlimited(),
            chat_messages: unlimited(),
            cache_recipe_search_via_chat: unlimited(),
            resets_at: None,
        },
        inventory: InventoryLimits {
            groceries_total: unlimited(),
            groceries_with_expiry: unlimited(),
        },
        notifications_enabled: true,
        has_priority_support: true,
    }
}
