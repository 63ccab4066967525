//! Maps the domain error taxonomy onto HTTP statuses and a JSON error body.
//! Clients match on the `error` kind, never the message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde_json::json;

pub struct ApiError(pub DomainError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self.0 {
            DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            DomainError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            DomainError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed"),
            DomainError::InvalidPassword
            | DomainError::EmailNotConfirmed
            | DomainError::InvalidToken => (StatusCode::UNAUTHORIZED, "unauthorized"),
            DomainError::UnableToCreate(_)
            | DomainError::UnableToUpdate(_)
            | DomainError::UnableToDelete(_)
            | DomainError::SlugExhausted
            | DomainError::Storage(_)
            | DomainError::Comms(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        // Opaque failures keep their detail in the log, not the response.
        let message = if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
            "internal error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(json!({ "error": kind, "message": message }))).into_response()
    }
}
