//! Authentication service — login/register/refresh flows delegating to
//! `pantry_core::auth`.

use sqlx::PgPool;
use tracing::info;

use pantry_core::auth::{jwt, password, queries, tokens};
use pantry_core::models::auth::{RequestContext, User};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::models::{
    LoginRequest, LogoutResponse, PublicUser, RegisterRequest, TokenResponse,
};

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

/// Normalize an email for storage and lookup: trimmed, lowercase.
fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Build a token response from a fresh pair.
fn build_token_response(state: &AppState, access_token: String, refresh_token: String) -> TokenResponse {
    TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.access_token_ttl_secs,
    }
}

/// Issue a fresh access + refresh pair for a user.
async fn issue_token_pair(
    state: &AppState,
    user: &User,
    ctx: &RequestContext,
) -> AppResult<TokenResponse> {
    let access_token = jwt::generate_access_token(
        user.id,
        &user.email,
        &user.role,
        state.config.access_token_ttl_secs,
        state.config.jwt_secret.as_bytes(),
    )?;
    let refresh_token =
        tokens::issue(&state.pool, user.id, state.config.refresh_ttl(), ctx).await?;
    Ok(build_token_response(state, access_token, refresh_token))
}

/// Register a new user account. The first user gets the admin role.
pub async fn register(state: &AppState, body: RegisterRequest) -> AppResult<PublicUser> {
    let (email, pw, name) = match (body.email, body.password, body.name) {
        (Some(e), Some(p), Some(n)) if !e.is_empty() && !p.is_empty() && !n.is_empty() => {
            (e, p, n)
        }
        _ => {
            return Err(AppError::Validation(
                "Email, password and name are required".into(),
            ));
        }
    };

    let email = normalize_email(&email);
    if !email.contains('@') {
        return Err(AppError::Validation("Invalid email address".into()));
    }
    if pw.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }

    if queries::email_exists(&state.pool, &email).await? {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let is_first_user = queries::user_count(&state.pool).await? == 0;
    let role = if is_first_user { "admin" } else { "user" };

    let pw_hash = password::hash_password(&pw)?;
    let user = queries::create_user(&state.pool, &email, &name, &pw_hash, role).await?;

    if is_first_user {
        info!(email = %user.email, "first user granted admin role");
    }

    Ok(PublicUser::from(&user))
}

/// Authenticate with email + password, producing a token pair.
pub async fn login(
    state: &AppState,
    body: LoginRequest,
    ctx: &RequestContext,
) -> AppResult<TokenResponse> {
    let (email, pw) = match (body.email, body.password) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e, p),
        _ => {
            return Err(AppError::Validation(
                "Email and password are required".into(),
            ));
        }
    };

    let email = normalize_email(&email);

    // Wrong email and wrong password fail identically.
    let (user_id, pw_hash) = queries::find_credentials_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

    if !password::verify_password(&pw, &pw_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let user = queries::get_user_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    issue_token_pair(state, &user, ctx).await
}

/// Exchange a refresh token for a new pair (single-use rotation).
///
/// An invalid, rotated, or expired token means the session is gone: the
/// caller discards both tokens and re-authenticates, never retries.
pub async fn refresh(
    state: &AppState,
    refresh_token: &str,
    ctx: &RequestContext,
) -> AppResult<TokenResponse> {
    let (user_id, next_secret) = tokens::rotate(
        &state.pool,
        refresh_token,
        state.config.refresh_ttl(),
        ctx,
    )
    .await?;

    let user = queries::get_user_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let access_token = jwt::generate_access_token(
        user.id,
        &user.email,
        &user.role,
        state.config.access_token_ttl_secs,
        state.config.jwt_secret.as_bytes(),
    )?;

    Ok(build_token_response(state, access_token, next_secret))
}

/// Logout — revoke a specific refresh token. Idempotent.
pub async fn logout(state: &AppState, refresh_token: Option<&str>) -> AppResult<LogoutResponse> {
    if let Some(token) = refresh_token {
        tokens::revoke(&state.pool, token).await?;
    }
    Ok(LogoutResponse { success: true })
}

/// Logout all sessions — revoke every active refresh token for a user.
pub async fn logout_all(state: &AppState, user_id: i64) -> AppResult<LogoutResponse> {
    tokens::revoke_all(&state.pool, user_id).await?;
    Ok(LogoutResponse { success: true })
}

/// Load the public record for an authenticated user.
pub async fn current_user(state: &AppState, user_id: i64) -> AppResult<PublicUser> {
    let user = queries::get_user_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(PublicUser::from(&user))
}

/// Create the demo identity if needed and return it.
///
/// Runs once at process startup when bypass mode is enabled, so concurrent
/// first requests cannot race to create it.
pub async fn bootstrap_demo_identity(pool: &PgPool) -> Result<CurrentUser, AppError> {
    let user = queries::ensure_demo_user(pool).await?;
    Ok(CurrentUser {
        id: user.id,
        email: user.email,
        role: user.role,
    })
}
