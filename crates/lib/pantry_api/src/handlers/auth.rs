//! Authentication request handlers.

use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json, extract::State};

use pantry_core::models::auth::RequestContext;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    LoginRequest, LogoutRequest, LogoutResponse, PublicUser, RefreshRequest, RegisterRequest,
    TokenResponse,
};
use crate::services::auth;

/// Request provenance for the refresh-token audit trail.
fn request_context(headers: &HeaderMap) -> RequestContext {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };
    RequestContext {
        user_agent: header_str("user-agent"),
        // First hop of X-Forwarded-For when running behind a proxy.
        ip_address: header_str("x-forwarded-for")
            .map(|v| v.split(',').next().unwrap_or("").trim().to_string())
            .filter(|v| !v.is_empty()),
    }
}

/// `POST /auth/register` — create a new user account.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    let user = auth::register(&state, body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /auth/login` — authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let ctx = request_context(&headers);
    let resp = auth::login(&state, body, &ctx).await?;
    Ok(Json(resp))
}

/// `POST /auth/refresh` — exchange a refresh token for a new token pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let ctx = request_context(&headers);
    let resp = auth::refresh(&state, &body.refresh_token, &ctx).await?;
    Ok(Json(resp))
}

/// `POST /auth/logout` — revoke a refresh token. Idempotent.
pub async fn logout_handler(
    State(state): State<AppState>,
    Json(body): Json<LogoutRequest>,
) -> AppResult<Json<LogoutResponse>> {
    let resp = auth::logout(&state, body.refresh_token.as_deref()).await?;
    Ok(Json(resp))
}

/// `POST /auth/logout-all` — revoke every active session. Requires auth.
pub async fn logout_all_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Json<LogoutResponse>> {
    let resp = auth::logout_all(&state, user.id).await?;
    Ok(Json(resp))
}

/// `GET /auth/me` — the authenticated user's public record.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Json<PublicUser>> {
    let resp = auth::current_user(&state, user.id).await?;
    Ok(Json(resp))
}
