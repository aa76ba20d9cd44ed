//! Router error taxonomy
//!
//! Every failure between parsing and formatting is one of these variants.
//! The formatter maps each variant to a status code and a JSON body.

use hyper::StatusCode;
use thiserror::Error;

/// Message sent to clients for any internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Status a handler asks the router to report for its error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerStatus {
    BadRequest,
    Unauthorized,
    NotFound,
    Internal,
}

impl HandlerStatus {
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the handler message may be shown to the caller
    pub const fn is_client_error(self) -> bool {
        !matches!(self, Self::Internal)
    }
}

/// Error raised by an operation handler.
///
/// Client statuses forward `message` to the caller. `Internal` errors are
/// reported as a generic 500 and the message only reaches the error log.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    pub status: HandlerStatus,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: HandlerStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(HandlerStatus::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(HandlerStatus::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(HandlerStatus::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(HandlerStatus::Internal, message)
    }
}

/// Errors surfaced while routing a single request
#[derive(Debug, Error)]
pub enum RouterError {
    /// Query `data` or request body is not the JSON shape the router expects.
    #[error("{0}")]
    Parse(String),
    /// No `operation` field, or an empty one.
    #[error("Operation parameter is required")]
    MissingOperation,
    /// `operation` is not registered.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
    /// Caller is not authenticated.
    #[error("Unauthorized")]
    Unauthorized,
    /// A dispatched handler reported an error.
    #[error(transparent)]
    Handler(#[from] HandlerError),
    /// A dispatched handler panicked or its task was aborted.
    #[error("handler for '{operation}' failed: {detail}")]
    UnhandledFault { operation: String, detail: String },
}

impl RouterError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Parse(_) | Self::MissingOperation | Self::UnknownOperation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Handler(err) => err.status.status_code(),
            Self::UnhandledFault { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the response `error` field
    pub fn client_message(&self) -> String {
        match self {
            Self::Handler(err) if err.status.is_client_error() => err.message.clone(),
            Self::Handler(_) | Self::UnhandledFault { .. } => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the full error needs to go to the error log
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_errors_map_to_400() {
        assert_eq!(
            RouterError::parse("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RouterError::MissingOperation.status_code(),
            StatusCode::BAD_REQUEST
        );
        let unknown = RouterError::UnknownOperation("deleteProfile".to_string());
        assert_eq!(unknown.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(unknown.client_message(), "Unknown operation: deleteProfile");
    }

    #[test]
    fn test_handler_client_error_keeps_message() {
        let err = RouterError::from(HandlerError::not_found("Profile not found"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.client_message(), "Profile not found");
        assert!(!err.is_internal());
    }

    #[test]
    fn test_internal_errors_hide_detail() {
        let err = RouterError::from(HandlerError::internal("table myai4-profiles missing"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), INTERNAL_ERROR_MESSAGE);
        assert!(err.is_internal());

        let fault = RouterError::UnhandledFault {
            operation: "createProfile".to_string(),
            detail: "index out of bounds".to_string(),
        };
        assert_eq!(fault.client_message(), INTERNAL_ERROR_MESSAGE);
        assert!(fault.to_string().contains("index out of bounds"));
    }
}
