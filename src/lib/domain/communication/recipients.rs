//! Header sanitizing and recipient-list normalization

use thiserror::Error;

/// A header-bound value contained a line break
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{field} must not contain line breaks")]
pub struct HeaderInjectionError {
    /// The offending field
    pub field: &'static str,
}

/// Rejects values that would let a caller inject extra SMTP headers.
///
/// # Returns
/// The value with surrounding whitespace removed, or a [`HeaderInjectionError`]
/// if it contains `\r` or `\n`.
pub fn sanitize_header(value: &str, field: &'static str) -> Result<String, HeaderInjectionError> {
    if value.contains(['\r', '\n']) {
        return Err(HeaderInjectionError { field });
    }

    Ok(value.trim().to_string())
}

/// Splits a comma-separated recipient string into trimmed addresses.
///
/// Absent or empty input yields an empty list. Order is preserved and
/// duplicates are kept.
pub fn normalize_recipients(
    raw: Option<&str>,
    field: &'static str,
) -> Result<Vec<String>, HeaderInjectionError> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(Vec::new()),
    };

    Ok(sanitize_header(raw, field)?
        .split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect())
}
