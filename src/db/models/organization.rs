//! Organization model and branding request/response types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::preview::BrandingSettings;

/// Organization stored in database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub logo: Option<String>,
    pub color: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Organization {
    /// Branding settings as stored, without defaults applied
    pub fn branding(&self) -> BrandingSettings {
        BrandingSettings {
            logo: self.logo.clone(),
            color: self.color.clone(),
        }
    }
}

/// Request to create an organization
#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Request to update an organization's branding.
///
/// Omitted fields are left unchanged; an empty string clears the field.
#[derive(Debug, Deserialize)]
pub struct UpdateBrandingRequest {
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Response DTO for Organization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationResponse {
    pub id: String,
    pub name: String,
    pub branding: BrandingSettings,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Organization> for OrganizationResponse {
    fn from(org: Organization) -> Self {
        Self {
            branding: org.branding(),
            id: org.id,
            name: org.name,
            created_at: org.created_at,
            updated_at: org.updated_at,
        }
    }
}
