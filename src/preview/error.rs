use thiserror::Error;

use super::ContentType;
use crate::templates::CompileError;

/// Which compilation pass failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilePhase {
    /// Round-trip of a single block field
    Sanitize,
    /// Final layout render
    Render,
}

impl std::fmt::Display for CompilePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sanitize => write!(f, "sanitize"),
            Self::Render => write!(f, "render"),
        }
    }
}

/// Errors that can occur while rendering a preview
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Content does not match content type '{content_type}': {reason}")]
    InvalidContentShape {
        content_type: ContentType,
        reason: String,
    },

    #[error("Organization '{0}' not found")]
    OrganizationNotFound(String),

    #[error("Template compilation failed during {phase}: {source}")]
    CompilationFailed {
        phase: CompilePhase,
        #[source]
        source: CompileError,
    },

    #[error("Branding lookup failed: {0}")]
    Upstream(String),
}

/// Flat classification of [`RenderError`] for callers that only branch on kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderErrorKind {
    InvalidContentShape,
    OrganizationNotFound,
    CompilationFailed,
    Upstream,
}

impl RenderError {
    pub fn kind(&self) -> RenderErrorKind {
        match self {
            Self::InvalidContentShape { .. } => RenderErrorKind::InvalidContentShape,
            Self::OrganizationNotFound(_) => RenderErrorKind::OrganizationNotFound,
            Self::CompilationFailed { .. } => RenderErrorKind::CompilationFailed,
            Self::Upstream(_) => RenderErrorKind::Upstream,
        }
    }

    pub(crate) fn sanitize(source: CompileError) -> Self {
        Self::CompilationFailed {
            phase: CompilePhase::Sanitize,
            source,
        }
    }

    pub(crate) fn render(source: CompileError) -> Self {
        Self::CompilationFailed {
            phase: CompilePhase::Render,
            source,
        }
    }
}
