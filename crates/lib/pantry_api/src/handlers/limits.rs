//! Limits request handlers.

use axum::{Extension, Json, extract::State};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::LimitsResponse;
use crate::services::quota;

/// `GET /user/limits` — resolved limits plus live usage snapshot.
pub async fn limits_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Json<LimitsResponse>> {
    let resp = quota::limits_snapshot(&state, user.id).await?;
    Ok(Json(resp))
}
