//! Authentication middleware — Bearer token extraction and JWT verification.
//!
//! Two gates: `require_auth` halts unauthenticated requests; `optional_auth`
//! lets them through with an explicit unauthenticated marker so handlers can
//! serve a reduced feature set. In bypass mode both resolve to the demo
//! identity bootstrapped at startup.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use pantry_core::auth::jwt::verify_access_token;
use pantry_core::models::auth::AccessClaims;

use crate::AppState;
use crate::error::AppError;

/// The identity an authenticated request acts as.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub role: String,
}

impl From<AccessClaims> for CurrentUser {
    fn from(claims: AccessClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Key used to store the verified identity in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub CurrentUser);

/// Key used by `optional_auth`: `None` marks an anonymous caller.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

/// Axum middleware: requires a valid bearer access token and injects
/// `AuthenticatedUser` into request extensions. The failure message is
/// deliberately generic — it never reveals whether an account exists.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.config.auth_bypass {
        let demo = state
            .demo_user
            .clone()
            .ok_or_else(|| AppError::Internal("bypass mode without demo identity".into()))?;
        request.extensions_mut().insert(AuthenticatedUser(demo));
        return Ok(next.run(request).await);
    }

    let user = verify_bearer(request.headers(), &state)
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))?;

    request.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(request).await)
}

/// Axum middleware: attempts verification but never halts the request.
/// Downstream handlers receive `MaybeUser(None)` for anonymous callers.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = if state.config.auth_bypass {
        // Demo identity counts as authenticated.
        state.demo_user.clone()
    } else {
        verify_bearer(request.headers(), &state)
    };

    request.extensions_mut().insert(MaybeUser(user));

    next.run(request).await
}

/// Extract and verify `Authorization: Bearer <token>`.
fn verify_bearer(headers: &HeaderMap, state: &AppState) -> Option<CurrentUser> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    verify_access_token(token, state.config.jwt_secret.as_bytes()).map(CurrentUser::from)
}
