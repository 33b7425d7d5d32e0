//! API request and response models.

use serde::{Deserialize, Serialize};

use pantry_core::models::auth::User;
use pantry_core::models::quota::ResolvedLimit;

/// Error response body. `kind` and `limit` are present only on quota
/// failures so clients can name the limit that was hit.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// `POST /auth/register` body. Fields are optional so that a missing one
/// maps to a 400 with a useful message rather than a body-rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// `POST /auth/login` body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `POST /auth/refresh` body.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// `POST /auth/logout` body. Logout without a token is still a success.
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// `POST /auth/logout` response.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Token pair returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Public user record — never carries the password verifier or counters.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
    pub notifications_enabled: bool,
    pub has_priority_support: bool,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
            notifications_enabled: user.notifications_enabled,
            has_priority_support: user.has_priority_support,
        }
    }
}

/// Rolling-quota section of the limits snapshot.
#[derive(Debug, Serialize)]
pub struct RollingLimits {
    pub llm_tokens: ResolvedLimit,
    pub recipe_calls: ResolvedLimit,
    pub resets_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Monthly-quota section of the limits snapshot.
#[derive(Debug, Serialize)]
pub struct MonthlyLimits {
    pub cache_recipe_suggestions: ResolvedLimit,
    pub chat_messages: ResolvedLimit,
    pub cache_recipe_search_via_chat: ResolvedLimit,
    pub resets_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Inventory ceilings, measured against live grocery counts.
#[derive(Debug, Serialize)]
pub struct InventoryLimits {
    pub groceries_total: ResolvedLimit,
    pub groceries_with_expiry: ResolvedLimit,
}

/// `GET /user/limits` response: resolved limits plus a live usage snapshot.
#[derive(Debug, Serialize)]
pub struct LimitsResponse {
    pub rolling: RollingLimits,
    pub monthly: MonthlyLimits,
    pub inventory: InventoryLimits,
    pub notifications_enabled: bool,
    pub has_priority_support: bool,
}
