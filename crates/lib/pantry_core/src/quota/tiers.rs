//! Tier policy resolution — effective limits from stored tier fields.
//!
//! Pure functions of the `User` record. Unset fields fall back to the
//! free-tier defaults; a stored limit of -1 means no ceiling regardless
//! of usage.

use crate::models::auth::User;
use crate::models::quota::{LimitKind, ResolvedLimit};

/// Free-tier default: total groceries in the inventory.
pub const DEFAULT_MAX_GROCERIES_TOTAL: i64 = 20;

/// Free-tier default: groceries with expiry tracking.
pub const DEFAULT_MAX_GROCERIES_WITH_EXPIRY: i64 = 10;

/// Free-tier default: cached recipe suggestions per month.
pub const DEFAULT_MAX_CACHE_RECIPE_SUGGESTIONS: i64 = 12;

/// Free-tier default: chat messages per month.
pub const DEFAULT_MAX_CHAT_MESSAGES: i64 = 4;

/// Free-tier default: recipe searches via chat per month.
pub const DEFAULT_MAX_CACHE_RECIPE_SEARCH_VIA_CHAT: i64 = 4;

/// Resolve the effective limit and usage for one kind.
///
/// The two grocery kinds measure usage against the live inventory, so the
/// caller supplies the externally-obtained count; `None` reads as an empty
/// inventory. The count is ignored for the three counter kinds.
pub fn resolve(user: &User, kind: LimitKind, live_count: Option<i64>) -> ResolvedLimit {
    let (limit, used) = match kind {
        LimitKind::GroceriesTotal => (
            user.max_groceries_total.unwrap_or(DEFAULT_MAX_GROCERIES_TOTAL),
            live_count.unwrap_or(0),
        ),
        LimitKind::GroceriesWithExpiry => (
            user.max_groceries_with_expiry
                .unwrap_or(DEFAULT_MAX_GROCERIES_WITH_EXPIRY),
            live_count.unwrap_or(0),
        ),
        LimitKind::CacheRecipeSuggestions => (
            user.max_cache_recipe_suggestions
                .unwrap_or(DEFAULT_MAX_CACHE_RECIPE_SUGGESTIONS),
            user.cache_recipe_suggestions_used,
        ),
        LimitKind::ChatMessages => (
            user.max_chat_messages.unwrap_or(DEFAULT_MAX_CHAT_MESSAGES),
            user.chat_messages_used,
        ),
        LimitKind::CacheRecipeSearchViaChat => (
            user.max_cache_recipe_search_via_chat
                .unwrap_or(DEFAULT_MAX_CACHE_RECIPE_SEARCH_VIA_CHAT),
            user.cache_recipe_search_via_chat_used,
        ),
    };
    ResolvedLimit { limit, used }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quota::UNLIMITED;

    fn user_with_defaults() -> User {
        User {
            id: 1,
            email: "t@t.test".into(),
            name: "t".into(),
            role: "user".into(),
            quota_llm_tokens: 50_000,
            llm_tokens_used: 0,
            quota_recipe_calls: 40,
            recipe_calls_used: 0,
            quota_reset_at: None,
            max_cache_recipe_suggestions: None,
            cache_recipe_suggestions_used: 0,
            max_chat_messages: None,
            chat_messages_used: 0,
            max_cache_recipe_search_via_chat: None,
            cache_recipe_search_via_chat_used: 0,
            monthly_limit_reset_at: None,
            max_groceries_total: None,
            max_groceries_with_expiry: None,
            notifications_enabled: true,
            has_priority_support: false,
        }
    }

    #[test]
    fn unset_fields_resolve_to_free_tier_defaults() {
        let user = user_with_defaults();
        assert_eq!(resolve(&user, LimitKind::GroceriesTotal, Some(3)).limit, 20);
        assert_eq!(
            resolve(&user, LimitKind::GroceriesWithExpiry, Some(3)).limit,
            10
        );
        assert_eq!(
            resolve(&user, LimitKind::CacheRecipeSuggestions, None).limit,
            12
        );
        assert_eq!(resolve(&user, LimitKind::ChatMessages, None).limit, 4);
        assert_eq!(
            resolve(&user, LimitKind::CacheRecipeSearchViaChat, None).limit,
            4
        );
    }

    #[test]
    fn stored_tier_fields_override_defaults() {
        let mut user = user_with_defaults();
        user.max_chat_messages = Some(100);
        user.max_groceries_total = Some(500);
        assert_eq!(resolve(&user, LimitKind::ChatMessages, None).limit, 100);
        assert_eq!(
            resolve(&user, LimitKind::GroceriesTotal, Some(7)).limit,
            500
        );
    }

    #[test]
    fn grocery_kinds_use_the_supplied_live_count() {
        let user = user_with_defaults();
        let resolved = resolve(&user, LimitKind::GroceriesTotal, Some(19));
        assert_eq!(resolved.used, 19);
        assert!(!resolved.is_exhausted());
        let resolved = resolve(&user, LimitKind::GroceriesTotal, Some(20));
        assert!(resolved.is_exhausted());
    }

    #[test]
    fn counter_kinds_use_the_stored_counter() {
        let mut user = user_with_defaults();
        user.chat_messages_used = 4;
        let resolved = resolve(&user, LimitKind::ChatMessages, None);
        assert_eq!(resolved.used, 4);
        assert!(resolved.is_exhausted());
    }

    #[test]
    fn unlimited_sentinel_never_exhausts() {
        let mut user = user_with_defaults();
        user.max_chat_messages = Some(UNLIMITED);
        user.chat_messages_used = i64::MAX;
        let resolved = resolve(&user, LimitKind::ChatMessages, None);
        assert_eq!(resolved.limit, UNLIMITED);
        assert!(!resolved.is_exhausted());
    }
}
