//! Errors returned by API calls

use thiserror::Error;

/// Message used when the backend does not explain a failed request
pub const DEFAULT_ERROR_MESSAGE: &str = "API request failed";

/// Message used when the backend cannot be reached
pub const CONNECTION_ERROR_MESSAGE: &str = "Could not connect to the server.";

/// Errors that can occur when calling the forum API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server could not be reached
    #[error("{0}")]
    Connection(String),

    /// The server answered with a non-2xx status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Failed to encode the request body
    #[error("Failed to encode request body: {0}")]
    EncodeError(String),
}

impl ApiError {
    /// Whether this is a non-2xx response with the given status code
    pub fn is_status(&self, code: u16) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_displays_backend_message() {
        let err = ApiError::Status {
            status: 404,
            message: "Post not found".to_string(),
        };

        assert_eq!(err.to_string(), "Post not found");
        assert!(err.is_status(404));
        assert!(!err.is_status(500));
    }

    #[test]
    fn test_connection_error_message() {
        let err = ApiError::Connection(CONNECTION_ERROR_MESSAGE.to_string());
        assert_eq!(err.to_string(), "Could not connect to the server.");
        assert!(!err.is_status(404));
    }
}
