//! Neutralizes template directives inside user-authored block fields.
//!
//! Editor blocks are embedded verbatim into the `basic` layout, so any `{{`
//! typed by the author must come out as text. Each field is escaped and then
//! run once through the compiler as an inline template, which turns the
//! escaped sequences back into literal delimiters.

use futures::future::try_join_all;
use serde_json::json;
use std::sync::Arc;

use super::{ContentBlock, RenderError};
use crate::templates::{TemplateCompiler, CUSTOM_TEMPLATE};

/// Sequence that opens a template directive
pub const OPEN_DELIM: &str = "{{";

/// Prefix that makes the compiler treat the following delimiter as text
pub const ESCAPE_PREFIX: &str = "\\";

/// Prefix every directive opener with the escape marker.
///
/// Closing delimiters are left alone.
pub fn escape_directives(field: &str) -> String {
    field.replace(OPEN_DELIM, &format!("{}{}", ESCAPE_PREFIX, OPEN_DELIM))
}

/// Split a field in front of every opener that already follows an escape prefix.
///
/// The compiler reads a doubled escape prefix before an opener as a literal
/// prefix and a live directive, so those openers must start a new piece.
/// Pieces never contain an opener directly after an escape prefix.
pub fn split_at_escaped_openers(field: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    for (idx, _) in field.match_indices(OPEN_DELIM) {
        if idx > start && field[..idx].ends_with(ESCAPE_PREFIX) {
            pieces.push(&field[start..idx]);
            start = idx;
        }
    }

    pieces.push(&field[start..]);
    pieces
}

pub struct ContentSanitizer {
    compiler: Arc<dyn TemplateCompiler>,
}

impl ContentSanitizer {
    pub fn new(compiler: Arc<dyn TemplateCompiler>) -> Self {
        Self { compiler }
    }

    /// Escape a single field and resolve it through the compiler.
    ///
    /// Fields without a prefixed opener take exactly one round-trip.
    pub async fn sanitize(&self, field: &str) -> Result<String, RenderError> {
        let pieces = split_at_escaped_openers(field);
        if let [piece] = pieces.as_slice() {
            return self.resolve_literal(piece).await;
        }

        let resolved = try_join_all(pieces.iter().map(|piece| self.resolve_literal(piece))).await?;
        Ok(resolved.concat())
    }

    async fn resolve_literal(&self, piece: &str) -> Result<String, RenderError> {
        let escaped = escape_directives(piece);
        self.compiler
            .compile(CUSTOM_TEMPLATE, Some(&escaped), &json!({}))
            .await
            .map_err(RenderError::sanitize)
    }

    /// Sanitize the text fields of one block, returning a new block.
    ///
    /// `content` is trimmed after sanitizing, `url` is not. A missing `url`
    /// becomes an empty string.
    pub async fn sanitize_block(&self, block: &ContentBlock) -> Result<ContentBlock, RenderError> {
        let url = block.url.as_deref().unwrap_or("");
        let (content, url) = tokio::try_join!(self.sanitize(&block.content), self.sanitize(url))?;

        Ok(ContentBlock {
            content: content.trim().to_string(),
            url: Some(url),
            extra: block.extra.clone(),
        })
    }

    /// Sanitize every block concurrently, keeping input order
    pub async fn sanitize_blocks(&self, blocks: &[ContentBlock]) -> Result<Vec<ContentBlock>, RenderError> {
        try_join_all(blocks.iter().map(|block| self.sanitize_block(block))).await
    }
}
