//! Errors from the settings backend.

use aqua_rewards_core::RulesError;
use thiserror::Error;

/// Errors that can occur when reading or writing settings.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token was rejected (401/403).
    #[error("Session expired: the API token was rejected")]
    SessionExpired,

    /// The backend refused the payload (400/422).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The backend failed (5xx).
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// Any other unexpected status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response or build a request.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Local validation rejected the settings before sending.
    #[error("Invalid settings: {0}")]
    Rules(#[from] RulesError),
}

impl ApiError {
    /// Map a non-success status and body to an error.
    pub(crate) fn from_status(status: u16, message: String, retry_after: Option<u64>) -> Self {
        match status {
            401 | 403 => Self::SessionExpired,
            404 => Self::NotFound(message),
            400 | 422 => Self::Validation(message),
            429 => Self::RateLimited(retry_after.unwrap_or(60)),
            500..=599 => Self::Server { status, message },
            _ => Self::Api { status, message },
        }
    }

    /// Whether retrying later could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::RateLimited(_) | Self::Server { .. }
        )
    }
}
