use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Request rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Request cancelled")]
    Cancelled,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape used by the backend for validation and auth failures
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull a human-readable `detail` string out of an error body.
    /// Structured details (validation error arrays) are not user-presentable.
    fn extract_detail(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail? {
            serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail),
            _ => None,
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        if status.is_client_error() {
            if let Some(detail) = Self::extract_detail(body) {
                return ApiError::Rejected {
                    status: status.as_u16(),
                    detail,
                };
            }
        }

        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Server-provided message for this error, if the backend sent one
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// Convert into a user-facing error for a failed action.
    /// The server detail wins; everything else shows `fallback`.
    pub fn into_action(self, fallback: &str) -> ActionError {
        let message = self.detail().unwrap_or(fallback).to_string();
        ActionError {
            message,
            source: self.into(),
        }
    }
}

/// A failed user action, carrying the message to show at the point of failure.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
    #[source]
    pub source: anyhow::Error,
}

impl ActionError {
    /// Wrap a local (non-network) failure under a generic message
    pub fn local(fallback: &str, source: anyhow::Error) -> Self {
        Self {
            message: fallback.to_string(),
            source,
        }
    }

    /// The API error behind this failure, if it came from the network layer
    pub fn api_error(&self) -> Option<&ApiError> {
        self.source.downcast_ref::<ApiError>()
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.api_error(), Some(ApiError::Cancelled))
    }
}
