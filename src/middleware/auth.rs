use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, injected into request extensions by
/// [`require_auth`]. Handlers never touch tokens; this is all they see.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Middleware guarding every collection and card route. A missing or
/// blank Authorization header and a bad token fail with distinct 401
/// messages so clients can tell "forgot the header" from "token expired".
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ApiError::unauthorized("No authorization token provided"))?;

    let token =
        bearer_token(header).ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    let user_id = state.verifier.verify(token).await?;
    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}

/// Pull the token out of a `Bearer <token>` header value. The scheme is
/// matched case-insensitively.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
