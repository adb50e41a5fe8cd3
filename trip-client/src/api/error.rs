//! API client error types.

use crate::domain::DomainError;

/// Broad origin of a failure, deciding how it is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or backend failure; local state is kept.
    Network,
    /// Rejected on the client before any request was sent.
    Validation,
    /// The backend no longer accepts the session.
    Authentication,
}

/// Errors from the backend HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend rejected the token; the session has been cleared
    #[error("authentication required, please log in again")]
    Unauthorized,

    /// Backend returned an error status code
    #[error("API error {status}: {detail}")]
    Backend { status: u16, detail: String },

    /// Response body did not match the expected shape
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Request blocked by client-side validation
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Http(_) | ApiError::Backend { .. } | ApiError::Json { .. } => {
                ErrorKind::Network
            }
            ApiError::Unauthorized => ErrorKind::Authentication,
            ApiError::Invalid(_) => ErrorKind::Validation,
        }
    }

    /// Message to show the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http(e) if e.is_timeout() => {
                "The server took too long to respond. Please try again.".to_string()
            }
            ApiError::Http(_) => "Could not reach the server. Check your connection.".to_string(),
            ApiError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            ApiError::Backend { detail, .. } => detail.clone(),
            ApiError::Json { .. } => "The server sent an unexpected response.".to_string(),
            ApiError::Invalid(e) => e.to_string(),
        }
    }
}
