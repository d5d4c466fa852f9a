/**
 * Backend Error Types
 *
 * This module defines the HTTP-facing error type of the backend. Handlers
 * return `BackendError` and Axum turns it into a JSON response.
 *
 * # Error Types
 *
 * - `HandlerError` - Request-level failures carrying their own status code
 * - `StateError` - Failures managing in-process state
 * - `ProtocolError` - Malformed real-time frames
 * - `Database` - Anything sqlx reports; always a 500
 *
 * Rule violations raised by the channel and invite services arrive as
 * `ModerationError` and are folded into `HandlerError` by the conversion
 * module, keeping their status code.
 */

use thiserror::Error;
use axum::http::StatusCode;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use roomcast::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., missing token, rule violation)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// State management error
    #[error("State error: {message}")]
    StateError {
        /// Human-readable error message
        message: String,
    },

    /// Real-time protocol error (unparseable client frame)
    #[error("Protocol error: {message}")]
    ProtocolError {
        /// Human-readable error message
        message: String,
    },

    /// Shared error (validation of wire types)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Create a new state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::StateError {
            message: message.into(),
        }
    }

    /// Create a new protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolError {
            message: message.into(),
        }
    }

    /// 401 with the given message
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, message)
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `StateError` - 500 Internal Server Error
    /// - `ProtocolError` - 400 Bad Request
    /// - `SharedError` - 400 for validation, 500 for serialization
    /// - `SerializationError` - 500 Internal Server Error
    /// - `Database` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::StateError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ProtocolError { .. } => StatusCode::BAD_REQUEST,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::MessageError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message shown to clients
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::StateError { message, .. } => message.clone(),
            Self::ProtocolError { message, .. } => message.clone(),
            Self::SharedError(SharedError::ValidationError { message, .. }) => message.clone(),
            Self::SharedError(SharedError::MessageError { message }) => message.clone(),
            Self::SharedError(err) => err.to_string(),
            Self::SerializationError(err) => err.to_string(),
            Self::Database(_) => "Internal server error".to_string(),
        }
    }
}
