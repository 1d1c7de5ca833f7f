//! Bearer authentication middleware for mutating routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::handlers::AppState;
use crate::auth::extract_bearer;
use crate::error::ApiError;

/// Rejects requests without a recognized bearer token and attaches the
/// resolved [`AuthenticatedUser`](crate::auth::AuthenticatedUser) otherwise.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = extract_bearer(header).ok_or_else(|| {
        ApiError::Unauthorized("Authorization header must use the Bearer scheme".to_string())
    })?;

    let user = state.auth.authenticate(token).await.ok_or_else(|| {
        debug!("Rejected unknown bearer token");
        ApiError::Unauthorized("Invalid bearer token".to_string())
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
