//! Error types for the OneHand API client.

use thiserror::Error;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request was rejected locally before anything was sent.
    #[error("Invalid request: {0}")]
    Invalid(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend answered with a non-2xx status.
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    #[must_use]
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Returns true if the backend refused the session token.
    #[must_use]
    pub fn needs_auth(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::status(500, "boom");
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_needs_auth() {
        assert!(ApiError::status(401, "").needs_auth());
        assert!(ApiError::status(403, "").needs_auth());
        assert!(!ApiError::status(500, "").needs_auth());
        assert!(!ApiError::Invalid("x".into()).needs_auth());
    }
}
