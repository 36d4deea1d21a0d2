use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::branding::{Branding, BrandingResolver, ResolveError};
use super::sanitize::ContentSanitizer;
use super::{PreviewContent, PreviewOutput, PreviewRequest, RenderContext, RenderError};
use crate::templates::{CompileError, TemplateCompiler, BASIC_TEMPLATE, CUSTOM_TEMPLATE};

/// Renders preview HTML for editor or custom content
pub struct PreviewRenderer {
    compiler: Arc<dyn TemplateCompiler>,
    branding: Arc<dyn BrandingResolver>,
    sanitizer: ContentSanitizer,
}

impl PreviewRenderer {
    pub fn new(compiler: Arc<dyn TemplateCompiler>, branding: Arc<dyn BrandingResolver>) -> Self {
        Self {
            sanitizer: ContentSanitizer::new(compiler.clone()),
            compiler,
            branding,
        }
    }

    /// Render a preview.
    ///
    /// Branding lookup and block sanitization run concurrently; the layout is
    /// compiled only once both have succeeded. The request is not modified.
    pub async fn render(&self, request: &PreviewRequest) -> Result<PreviewOutput, RenderError> {
        let result = self.render_inner(request).await;

        match &result {
            Ok(output) => debug!(
                organization_id = %request.organization_id,
                environment_id = %request.environment_id,
                content_type = %request.content_type(),
                html_len = output.html.len(),
                "Rendered preview"
            ),
            Err(e) => warn!(
                organization_id = %request.organization_id,
                user_id = %request.user_id,
                content_type = %request.content_type(),
                error = %e,
                "Preview render failed"
            ),
        }

        result
    }

    async fn render_inner(&self, request: &PreviewRequest) -> Result<PreviewOutput, RenderError> {
        let (branding, content) = tokio::try_join!(
            self.resolve_branding(&request.organization_id),
            self.normalize(&request.content),
        )?;

        let (template_id, inline_template, blocks) = match content {
            PreviewContent::Editor(blocks) => (BASIC_TEMPLATE, None, blocks),
            PreviewContent::Custom(body) => (CUSTOM_TEMPLATE, Some(body), Vec::new()),
        };

        debug!(
            template_id = %template_id,
            block_count = blocks.len(),
            color = %branding.color,
            "Compiling preview"
        );

        let data = context_value(RenderContext { blocks, branding }, template_id)?;
        let html = self
            .compiler
            .compile(template_id, inline_template.as_deref(), &data)
            .await
            .map_err(RenderError::render)?;

        Ok(PreviewOutput { html })
    }

    async fn resolve_branding(&self, organization_id: &str) -> Result<Branding, RenderError> {
        let settings = self
            .branding
            .resolve(organization_id)
            .await
            .map_err(|e| match e {
                ResolveError::NotFound(id) => RenderError::OrganizationNotFound(id),
                ResolveError::Backend(message) => RenderError::Upstream(message),
            })?;

        Ok(Branding::from(settings))
    }

    async fn normalize(&self, content: &PreviewContent) -> Result<PreviewContent, RenderError> {
        match content {
            PreviewContent::Editor(blocks) => {
                let blocks = self.sanitizer.sanitize_blocks(blocks).await?;
                Ok(PreviewContent::Editor(blocks))
            }
            PreviewContent::Custom(body) => Ok(PreviewContent::Custom(body.clone())),
        }
    }
}

fn context_value(context: RenderContext, template_id: &str) -> Result<Value, RenderError> {
    serde_json::to_value(context).map_err(|e| {
        RenderError::render(CompileError::Render {
            name: template_id.to_string(),
            message: e.to_string(),
        })
    })
}
