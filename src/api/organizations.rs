//! Organization branding API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    CreateOrganizationRequest, Organization, OrganizationResponse, UpdateBrandingRequest,
};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_brand_color, validate_identifier, validate_logo_url, validate_organization_name,
};

/// Empty strings clear a branding field
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

async fn fetch_organization(state: &AppState, id: &str) -> Result<Organization, ApiError> {
    sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Organization not found"))
}

/// Create a new organization
pub async fn create_organization(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<OrganizationResponse>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("name", validate_organization_name(&req.name));
    if let Some(ref logo) = req.logo {
        errors.check("logo", validate_logo_url(logo));
    }
    if let Some(ref color) = req.color {
        errors.check("color", validate_brand_color(color));
    }
    errors.finish()?;

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO organizations (id, name, logo, color, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(req.name.trim())
    .bind(non_empty(req.logo))
    .bind(non_empty(req.color))
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create organization: {}", e);
        ApiError::database("Failed to create organization")
    })?;

    let organization = fetch_organization(&state, &id).await?;

    tracing::info!(organization_id = %id, "Organization created");

    Ok((StatusCode::CREATED, Json(organization.into())))
}

/// Get an organization by ID
pub async fn get_organization(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrganizationResponse>, ApiError> {
    validate_identifier(&id, "organization_id")
        .map_err(|e| ApiError::validation_field("organization_id", e))?;

    let organization = fetch_organization(&state, &id).await?;

    Ok(Json(organization.into()))
}

/// Update an organization's branding
pub async fn update_branding(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateBrandingRequest>,
) -> Result<Json<OrganizationResponse>, ApiError> {
    validate_identifier(&id, "organization_id")
        .map_err(|e| ApiError::validation_field("organization_id", e))?;

    let mut errors = ValidationErrorBuilder::new();
    if let Some(ref logo) = req.logo {
        errors.check("logo", validate_logo_url(logo));
    }
    if let Some(ref color) = req.color {
        errors.check("color", validate_brand_color(color));
    }
    errors.finish()?;

    let existing = fetch_organization(&state, &id).await?;

    let logo = match req.logo {
        Some(logo) => non_empty(Some(logo)),
        None => existing.logo,
    };
    let color = match req.color {
        Some(color) => non_empty(Some(color)),
        None => existing.color,
    };
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query("UPDATE organizations SET logo = ?, color = ?, updated_at = ? WHERE id = ?")
        .bind(&logo)
        .bind(&color)
        .bind(&now)
        .bind(&id)
        .execute(&state.db)
        .await?;

    let organization = fetch_organization(&state, &id).await?;

    tracing::info!(organization_id = %id, "Organization branding updated");

    Ok(Json(organization.into()))
}
