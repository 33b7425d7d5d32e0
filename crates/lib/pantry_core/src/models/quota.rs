//! Quota domain models.
//!
//! Quota kinds are closed enums mapped through explicit matches to their
//! counter columns, so an unrecognized kind cannot silently no-op.

use serde::Serialize;

/// Sentinel limit value meaning "no ceiling".
pub const UNLIMITED: i64 = -1;

/// Counters reset on a fixed interval anchored to the last reset time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollingQuotaKind {
    LlmTokens,
    RecipeCalls,
}

impl RollingQuotaKind {
    /// Stable machine-readable key, used in error payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            RollingQuotaKind::LlmTokens => "llm_tokens",
            RollingQuotaKind::RecipeCalls => "recipe_calls",
        }
    }
}

impl std::fmt::Display for RollingQuotaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RollingQuotaKind::LlmTokens => "LLM token",
            RollingQuotaKind::RecipeCalls => "recipe call",
        };
        write!(f, "{label}")
    }
}

/// Tier-resolved limits: three monthly counters plus two ceilings measured
/// against the live grocery inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    GroceriesTotal,
    GroceriesWithExpiry,
    CacheRecipeSuggestions,
    ChatMessages,
    CacheRecipeSearchViaChat,
}

impl LimitKind {
    /// Stable machine-readable key, used in error payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitKind::GroceriesTotal => "groceries_total",
            LimitKind::GroceriesWithExpiry => "groceries_with_expiry",
            LimitKind::CacheRecipeSuggestions => "cache_recipe_suggestions",
            LimitKind::ChatMessages => "chat_messages",
            LimitKind::CacheRecipeSearchViaChat => "cache_recipe_search_via_chat",
        }
    }

    /// Whether usage for this kind is measured against a live inventory
    /// count rather than a stored monthly counter.
    pub fn is_inventory(&self) -> bool {
        matches!(
            self,
            LimitKind::GroceriesTotal | LimitKind::GroceriesWithExpiry
        )
    }
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LimitKind::GroceriesTotal => "grocery",
            LimitKind::GroceriesWithExpiry => "expiry-tracked grocery",
            LimitKind::CacheRecipeSuggestions => "recipe suggestion",
            LimitKind::ChatMessages => "chat message",
            LimitKind::CacheRecipeSearchViaChat => "recipe search via chat",
        };
        write!(f, "{label}")
    }
}

/// Effective limit and usage for one kind, after tier resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLimit {
    pub limit: i64,
    pub used: i64,
}

impl ResolvedLimit {
    /// True when the limit is bounded and already fully consumed.
    pub fn is_exhausted(&self) -> bool {
        self.limit != UNLIMITED && self.used >= self.limit
    }
}
