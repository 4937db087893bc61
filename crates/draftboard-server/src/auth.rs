//! Bearer-token authentication for the API routes.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::api::AppState;
use crate::error::ServerError;

/// Middleware guarding every data route.  Uploads and the health check
/// are served outside it.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let auth = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or(auth);

    // Constant-time comparison so the token cannot be probed byte by byte.
    let token_bytes = token.as_bytes();
    let expected_bytes = state.config.api_token.as_bytes();
    if token_bytes.len() != expected_bytes.len()
        || token_bytes.ct_eq(expected_bytes).unwrap_u8() != 1
    {
        return Err(ServerError::Unauthorized);
    }

    Ok(next.run(request).await)
}
