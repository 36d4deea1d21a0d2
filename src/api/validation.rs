//! Input validation for API requests.
//!
//! For collecting multiple validation errors and returning them as an ApiError,
//! use the `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for `#rgb` and `#rrggbb` hex colors
    static ref HEX_COLOR_REGEX: Regex = Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap();

    /// Regex for absolute HTTP/HTTPS URLs without whitespace
    static ref HTTP_URL_REGEX: Regex = Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap();
}

/// Validate an organization name
pub fn validate_organization_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if name.len() > 100 {
        return Err("Name must be 100 characters or less".to_string());
    }

    Ok(())
}

/// Validate a brand color. Empty clears the color.
pub fn validate_brand_color(color: &str) -> Result<(), String> {
    if color.is_empty() || HEX_COLOR_REGEX.is_match(color) {
        Ok(())
    } else {
        Err("Color must be a hex value like #f47373".to_string())
    }
}

/// Validate a logo URL. Empty clears the logo.
pub fn validate_logo_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Ok(());
    }

    if url.len() > 2048 {
        return Err("Logo URL is too long (max 2048 characters)".to_string());
    }

    if !HTTP_URL_REGEX.is_match(url) {
        return Err("Logo URL must be an http:// or https:// URL".to_string());
    }

    Ok(())
}

/// Validate a resource identifier from a path or header
pub fn validate_identifier(value: &str, field: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{} is required", field));
    }

    if value.len() > 128 {
        return Err(format!("{} is too long (max 128 characters)", field));
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!("{} contains invalid characters", field));
    }

    Ok(())
}
