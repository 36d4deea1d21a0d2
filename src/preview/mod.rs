//! Email preview rendering.
//!
//! A preview request carries either editor-authored blocks or a single raw
//! template body. [`PreviewRenderer`] sanitizes block fields, resolves the
//! organization's branding in parallel, and compiles the final HTML.

pub mod branding;
mod error;
mod renderer;
pub mod sanitize;

pub use branding::{Branding, BrandingResolver, BrandingSettings, ResolveError, SqliteBrandingResolver};
pub use error::{CompilePhase, RenderError, RenderErrorKind};
pub use renderer::PreviewRenderer;
pub use sanitize::ContentSanitizer;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How the preview content was authored
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContentType {
    /// Structured blocks from the visual editor
    #[serde(rename = "editor")]
    Editor,
    /// A single raw template body
    #[serde(rename = "customHtml", alias = "custom")]
    Custom,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Editor => write!(f, "editor"),
            Self::Custom => write!(f, "customHtml"),
        }
    }
}

/// One editor-authored unit of email content.
///
/// Only `content` and `url` are interpreted; every other field (`type`,
/// `styles`, ...) passes through to the layout untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentBlock {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
impl ContentBlock {
    pub fn text(content: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert("type".to_string(), Value::String("text".to_string()));
        Self {
            content: content.into(),
            url: None,
            extra,
        }
    }

    pub fn button(content: impl Into<String>, url: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert("type".to_string(), Value::String("button".to_string()));
        Self {
            content: content.into(),
            url: Some(url.into()),
            extra,
        }
    }
}

/// Preview content, shaped by how it was authored
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewContent {
    Editor(Vec<ContentBlock>),
    Custom(String),
}

impl PreviewContent {
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Editor(_) => ContentType::Editor,
            Self::Custom(_) => ContentType::Custom,
        }
    }
}

/// A validated preview request
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub content: PreviewContent,
    pub organization_id: String,
    pub environment_id: String,
    pub user_id: String,
}

impl PreviewRequest {
    pub fn content_type(&self) -> ContentType {
        self.content.content_type()
    }
}

/// Preview command as received on the wire, before its content shape is checked
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewEmailCommand {
    pub content_type: ContentType,
    pub content: Value,
}

impl PreviewEmailCommand {
    /// Check that `content` matches `content_type` and build a typed request.
    ///
    /// Editor content must be an array of blocks and custom content a string.
    pub fn into_request(
        self,
        organization_id: String,
        environment_id: String,
        user_id: String,
    ) -> Result<PreviewRequest, RenderError> {
        let content = match (self.content_type, self.content) {
            (ContentType::Editor, value @ Value::Array(_)) => {
                let blocks: Vec<ContentBlock> = serde_json::from_value(value).map_err(|e| {
                    RenderError::InvalidContentShape {
                        content_type: ContentType::Editor,
                        reason: e.to_string(),
                    }
                })?;
                PreviewContent::Editor(blocks)
            }
            (ContentType::Custom, Value::String(body)) => PreviewContent::Custom(body),
            (content_type, other) => {
                return Err(RenderError::InvalidContentShape {
                    content_type,
                    reason: format!("unexpected {} payload", json_kind(&other)),
                })
            }
        };

        Ok(PreviewRequest {
            content,
            organization_id,
            environment_id,
            user_id,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Data handed to the template compiler for the final render
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext {
    pub blocks: Vec<ContentBlock>,
    pub branding: Branding,
}

/// Rendered preview
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreviewOutput {
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn command(value: Value) -> PreviewEmailCommand {
        serde_json::from_value(value).unwrap()
    }

    fn ids() -> (String, String, String) {
        ("org-1".to_string(), "env-1".to_string(), "user-1".to_string())
    }

    #[test]
    fn test_content_type_wire_names() {
        let editor: ContentType = serde_json::from_value(json!("editor")).unwrap();
        let custom: ContentType = serde_json::from_value(json!("customHtml")).unwrap();
        let alias: ContentType = serde_json::from_value(json!("custom")).unwrap();

        assert_eq!(editor, ContentType::Editor);
        assert_eq!(custom, ContentType::Custom);
        assert_eq!(alias, ContentType::Custom);
        assert!(serde_json::from_value::<ContentType>(json!("markdown")).is_err());
    }

    #[test]
    fn test_editor_command_keeps_passthrough_fields() {
        let cmd = command(json!({
            "contentType": "editor",
            "content": [
                { "type": "text", "content": "Hi", "styles": { "textAlign": "center" } },
                { "type": "button", "content": "Go", "url": "https://example.com" }
            ]
        }));
        let (org, env, user) = ids();

        let request = cmd.into_request(org, env, user).unwrap();

        assert_eq!(request.content_type(), ContentType::Editor);
        let PreviewContent::Editor(blocks) = request.content else {
            panic!("Expected editor content");
        };
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].url, None);
        assert_eq!(blocks[0].extra["styles"], json!({ "textAlign": "center" }));
        assert_eq!(blocks[1].url.as_deref(), Some("https://example.com"));
        assert_eq!(blocks[1].extra["type"], json!("button"));
    }

    #[test]
    fn test_custom_command() {
        let cmd = command(json!({ "contentType": "customHtml", "content": "Hello {{user.name}}" }));
        let (org, env, user) = ids();

        let request = cmd.into_request(org, env, user).unwrap();

        assert_eq!(
            request.content,
            PreviewContent::Custom("Hello {{user.name}}".to_string())
        );
    }

    #[test]
    fn test_custom_with_array_is_invalid_shape() {
        let cmd = command(json!({ "contentType": "customHtml", "content": [{ "content": "x" }] }));
        let (org, env, user) = ids();

        let err = cmd.into_request(org, env, user).unwrap_err();

        assert_eq!(err.kind(), RenderErrorKind::InvalidContentShape);
    }

    #[test]
    fn test_editor_with_string_is_invalid_shape() {
        let cmd = command(json!({ "contentType": "editor", "content": "<p>raw</p>" }));
        let (org, env, user) = ids();

        let err = cmd.into_request(org, env, user).unwrap_err();

        assert_eq!(err.kind(), RenderErrorKind::InvalidContentShape);
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn test_editor_with_malformed_block_is_invalid_shape() {
        let cmd = command(json!({ "contentType": "editor", "content": [{ "content": 42 }] }));
        let (org, env, user) = ids();

        let err = cmd.into_request(org, env, user).unwrap_err();

        assert_eq!(err.kind(), RenderErrorKind::InvalidContentShape);
    }

    #[test]
    fn test_block_serializes_flat() {
        let block = ContentBlock::button("Go", "https://example.com");
        let value = serde_json::to_value(&block).unwrap();

        assert_eq!(
            value,
            json!({ "type": "button", "content": "Go", "url": "https://example.com" })
        );
    }
}
