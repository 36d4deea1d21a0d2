use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::AppState;

/// Extract the API token from `Authorization: Bearer` or `X-API-Key`
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(header) = headers.get("Authorization").and_then(|h| h.to_str().ok()) {
        let token = header.strip_prefix("Bearer ").unwrap_or(header);
        return Some(token.to_string());
    }

    headers
        .get("X-API-Key")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}

/// Compare a provided token with the configured admin token in constant time
pub fn token_matches(expected: &str, provided: &str) -> bool {
    let expected = expected.as_bytes();
    let provided = provided.as_bytes();

    // Only compare if lengths match (constant-time check)
    expected.len() == provided.len() && expected.ct_eq(provided).into()
}

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_token(request.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    if token_matches(&state.config.auth.admin_token, &token) {
        Ok(next.run(request).await)
    } else {
        tracing::debug!(path = %request.uri().path(), "Rejected request with invalid token");
        Err(StatusCode::UNAUTHORIZED)
    }
}
