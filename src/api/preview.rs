//! Email preview endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;

use crate::preview::{PreviewEmailCommand, PreviewOutput};
use crate::AppState;

use super::error::ApiError;
use super::validation::validate_identifier;

const ORGANIZATION_HEADER: &str = "x-organization-id";
const ENVIRONMENT_HEADER: &str = "x-environment-id";
const USER_HEADER: &str = "x-user-id";

/// Caller identities resolved upstream and forwarded as headers
#[derive(Debug)]
struct RequestScope {
    organization_id: String,
    environment_id: String,
    user_id: String,
}

impl RequestScope {
    fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let organization_id = header(ORGANIZATION_HEADER);
        validate_identifier(&organization_id, "organization_id")
            .map_err(|e| ApiError::validation_field("organization_id", e))?;

        Ok(Self {
            organization_id,
            environment_id: header(ENVIRONMENT_HEADER),
            user_id: header(USER_HEADER),
        })
    }
}

/// Render an email preview for editor blocks or a custom template body
pub async fn preview_email(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<PreviewEmailCommand>, JsonRejection>,
) -> Result<Json<PreviewOutput>, ApiError> {
    let scope = RequestScope::from_headers(&headers)?;
    let Json(command) = payload.map_err(|e| ApiError::validation_field("body", e.body_text()))?;
    let request = command.into_request(scope.organization_id, scope.environment_id, scope.user_id)?;

    let output = state.renderer.render(&request).await?;

    Ok(Json(output))
}
