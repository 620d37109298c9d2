//! Transport-neutral error kinds for the artifact service.
//!
//! Each variant maps to exactly one HTTP status, mirroring the teacher's
//! `S3Error` → `Response` dispatch: one match arm, one response shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    InputError(String),

    #[error("{0}")]
    RequestConflict(String),

    #[error("{0}")]
    ResourceNotFound(String),

    #[error("insufficient scopes")]
    AuthorizationError,

    #[error("internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::InputError(_) => "InputError",
            ServiceError::RequestConflict(_) => "RequestConflict",
            ServiceError::ResourceNotFound(_) => "ResourceNotFound",
            ServiceError::AuthorizationError => "AuthorizationError",
            ServiceError::InternalError(_) => "InternalError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::InputError(_) => StatusCode::BAD_REQUEST,
            ServiceError::RequestConflict(_) => StatusCode::CONFLICT,
            ServiceError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::AuthorizationError => StatusCode::FORBIDDEN,
            ServiceError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if matches!(self, ServiceError::InternalError(_)) {
            tracing::error!(code = self.code(), "{}", self);
        }

        let body = ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
