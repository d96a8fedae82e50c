//! Error types for core records.

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while building or parsing core records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A required field was absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A photo identifier did not have the `k<number>` shape.
    #[error("invalid photo id: {0}")]
    InvalidPhotoId(String),
}

/// Return the trimmed value if present and non-empty.
pub(crate) fn required(field: &'static str, value: Option<String>) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(CoreError::MissingField(field))
}

/// Return the trimmed value, or `default` when absent or empty.
pub(crate) fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
