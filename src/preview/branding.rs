//! Organization branding lookup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::Organization;
use crate::DbPool;

/// Accent color used when an organization has none configured
pub const DEFAULT_BRAND_COLOR: &str = "#f47373";

/// Branding as stored for an organization; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingSettings {
    pub logo: Option<String>,
    pub color: Option<String>,
}

/// Branding as exposed to templates, with the color always resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    pub logo: Option<String>,
    pub color: String,
}

impl From<BrandingSettings> for Branding {
    fn from(settings: BrandingSettings) -> Self {
        let color = settings
            .color
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_BRAND_COLOR.to_string());

        Self {
            logo: settings.logo,
            color,
        }
    }
}

/// Errors returned by a [`BrandingResolver`]
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Organization '{0}' not found")]
    NotFound(String),

    #[error("Branding backend error: {0}")]
    Backend(String),
}

/// Looks up branding settings for an organization
#[async_trait]
pub trait BrandingResolver: Send + Sync {
    async fn resolve(&self, organization_id: &str) -> Result<BrandingSettings, ResolveError>;
}

/// Resolves branding from the `organizations` table
pub struct SqliteBrandingResolver {
    db: DbPool,
}

impl SqliteBrandingResolver {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BrandingResolver for SqliteBrandingResolver {
    async fn resolve(&self, organization_id: &str) -> Result<BrandingSettings, ResolveError> {
        let organization =
            sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = ?")
                .bind(organization_id)
                .fetch_optional(&self.db)
                .await
                .map_err(|e| ResolveError::Backend(e.to_string()))?
                .ok_or_else(|| ResolveError::NotFound(organization_id.to_string()))?;

        Ok(organization.branding())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_missing_color_falls_back_to_default() {
        let branding = Branding::from(BrandingSettings {
            logo: Some("https://cdn.example.com/logo.png".to_string()),
            color: None,
        });
        assert_eq!(branding.color, "#f47373");
        assert_eq!(branding.logo.as_deref(), Some("https://cdn.example.com/logo.png"));
    }

    #[test]
    fn test_empty_color_falls_back_to_default() {
        let branding = Branding::from(BrandingSettings {
            logo: None,
            color: Some(String::new()),
        });
        assert_eq!(branding.color, DEFAULT_BRAND_COLOR);
    }

    #[test]
    fn test_configured_color_is_kept() {
        let branding = Branding::from(BrandingSettings {
            logo: None,
            color: Some("#112233".to_string()),
        });
        assert_eq!(branding.color, "#112233");
    }

    #[tokio::test]
    async fn test_sqlite_resolver_reads_branding() {
        let pool = db::init_in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO organizations (id, name, logo, color, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind("org-1")
        .bind("Acme")
        .bind("https://cdn.example.com/acme.png")
        .bind("#112233")
        .bind("2024-01-01T00:00:00Z")
        .bind("2024-01-01T00:00:00Z")
        .execute(&pool)
        .await
        .unwrap();

        let resolver = SqliteBrandingResolver::new(pool);
        let settings = resolver.resolve("org-1").await.unwrap();

        assert_eq!(settings.logo.as_deref(), Some("https://cdn.example.com/acme.png"));
        assert_eq!(settings.color.as_deref(), Some("#112233"));
    }

    #[tokio::test]
    async fn test_sqlite_resolver_unknown_organization() {
        let pool = db::init_in_memory().await.unwrap();
        let resolver = SqliteBrandingResolver::new(pool);

        let err = resolver.resolve("missing").await.unwrap_err();

        assert!(matches!(err, ResolveError::NotFound(ref id) if id == "missing"));
    }
}
