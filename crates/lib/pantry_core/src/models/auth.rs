//! Authentication domain models.

use serde::{Deserialize, Serialize};

/// Domain user. The password verifier is deliberately not part of this
/// struct; credential checks go through `auth::queries::find_credentials_by_email`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,

    // Rolling quota. A limit of -1 means no ceiling.
    pub quota_llm_tokens: i64,
    pub llm_tokens_used: i64,
    pub quota_recipe_calls: i64,
    pub recipe_calls_used: i64,
    pub quota_reset_at: Option<chrono::DateTime<chrono::Utc>>,

    // Monthly quota. NULL limits fall back to free-tier defaults.
    pub max_cache_recipe_suggestions: Option<i64>,
    pub cache_recipe_suggestions_used: i64,
    pub max_chat_messages: Option<i64>,
    pub chat_messages_used: i64,
    pub max_cache_recipe_search_via_chat: Option<i64>,
    pub cache_recipe_search_via_chat_used: i64,
    pub monthly_limit_reset_at: Option<chrono::DateTime<chrono::Utc>>,

    // Inventory ceilings, measured against live grocery counts.
    pub max_groceries_total: Option<i64>,
    pub max_groceries_with_expiry: Option<i64>,

    pub notifications_enabled: bool,
    pub has_priority_support: bool,
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject — user ID (standard JWT `sub` claim).
    pub sub: i64,
    /// User email.
    pub email: String,
    /// User role (e.g. `"user"`, `"admin"`).
    pub role: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

/// Request provenance recorded alongside each refresh token for audit.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}
