/**
 * Error Conversion
 *
 * This module provides conversion implementations for backend errors,
 * allowing them to be converted to HTTP responses.
 *
 * # Response Format
 *
 * Error responses are returned as JSON with the following structure:
 * ```json
 * {
 *   "error": "Error message",
 *   "status": 400
 * }
 * ```
 */

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use crate::backend::error::moderation::ModerationError;
use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("[Server] {}", self);
        }

        let body = serde_json::json!({
            "error": self.message(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<ModerationError> for BackendError {
    fn from(err: ModerationError) -> Self {
        match err {
            ModerationError::Database(e) => BackendError::Database(e),
            ModerationError::Invalid(e) => BackendError::SharedError(e),
            other => BackendError::handler(other.status_code(), other.to_string()),
        }
    }
}
