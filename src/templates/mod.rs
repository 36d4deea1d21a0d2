//! Template compilation for preview rendering.
//!
//! The preview pipeline only talks to the [`TemplateCompiler`] trait. The
//! production implementation is [`HandlebarsCompiler`], which ships the
//! built-in `basic` editor layout, renders inline `custom` bodies, and can pick
//! up extra `*.hbs` templates from a configured directory.

mod helpers;

use anyhow::{Context, Result};
use async_trait::async_trait;
use handlebars::Handlebars;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::TemplatesConfig;

/// Built-in layout used for editor-authored block content
pub const BASIC_TEMPLATE: &str = "basic";

/// Identifier that selects the inline template body instead of a registered one
pub const CUSTOM_TEMPLATE: &str = "custom";

const BASIC_TEMPLATE_SOURCE: &str = include_str!("basic.hbs");

/// Errors that can occur while compiling a template
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Template '{0}' is not registered")]
    UnknownTemplate(String),

    #[error("Template 'custom' requires an inline template body")]
    MissingInlineTemplate,

    #[error("Invalid template '{name}': {message}")]
    Template { name: String, message: String },

    #[error("Failed to render template '{name}': {message}")]
    Render { name: String, message: String },
}

/// Produces a string from a template identifier (or inline body) and a data context
#[async_trait]
pub trait TemplateCompiler: Send + Sync {
    async fn compile(
        &self,
        template_id: &str,
        inline_template: Option<&str>,
        data: &Value,
    ) -> Result<String, CompileError>;
}

/// Handlebars-backed template compiler
pub struct HandlebarsCompiler {
    registry: Handlebars<'static>,
}

impl HandlebarsCompiler {
    /// Create a compiler with only the built-in templates and helpers registered
    pub fn builtin() -> Result<Self, CompileError> {
        let mut registry = Handlebars::new();
        helpers::register(&mut registry);

        registry
            .register_template_string(BASIC_TEMPLATE, BASIC_TEMPLATE_SOURCE)
            .map_err(|e| CompileError::Template {
                name: BASIC_TEMPLATE.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self { registry })
    }

    /// Create a compiler from configuration, loading any extra templates on disk
    pub fn from_config(config: &TemplatesConfig) -> Result<Self> {
        let mut compiler = Self::builtin().context("Failed to register built-in templates")?;
        compiler.registry.set_strict_mode(config.strict_mode);

        if let Some(ref dir) = config.directory {
            let count = compiler.load_directory(dir)?;
            info!("Registered {} templates from {}", count, dir.display());
        }

        Ok(compiler)
    }

    /// Register every `*.hbs` file in `dir` under its file stem.
    ///
    /// The reserved `custom` identifier is skipped. A file named `basic.hbs`
    /// replaces the built-in layout.
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read template directory: {}", dir.display()))?;

        let mut count = 0;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("hbs") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if name == CUSTOM_TEMPLATE {
                tracing::warn!(path = %path.display(), "Skipping template with reserved name");
                continue;
            }

            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template: {}", path.display()))?;
            self.registry
                .register_template_string(name, source)
                .with_context(|| format!("Invalid template: {}", path.display()))?;

            debug!(template = %name, "Registered template");
            count += 1;
        }

        Ok(count)
    }

    #[cfg(test)]
    fn has_template(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }
}

#[async_trait]
impl TemplateCompiler for HandlebarsCompiler {
    async fn compile(
        &self,
        template_id: &str,
        inline_template: Option<&str>,
        data: &Value,
    ) -> Result<String, CompileError> {
        if template_id == CUSTOM_TEMPLATE {
            let body = inline_template.ok_or(CompileError::MissingInlineTemplate)?;
            return self
                .registry
                .render_template(body, data)
                .map_err(|e| CompileError::Render {
                    name: CUSTOM_TEMPLATE.to_string(),
                    message: e.to_string(),
                });
        }

        if !self.registry.has_template(template_id) {
            return Err(CompileError::UnknownTemplate(template_id.to_string()));
        }

        self.registry
            .render(template_id, data)
            .map_err(|e| CompileError::Render {
                name: template_id.to_string(),
                message: e.to_string(),
            })
    }
}
