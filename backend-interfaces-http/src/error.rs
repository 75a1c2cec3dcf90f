use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use backend_application::AppError;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("not a member of the owning team")]
    Forbidden,
    #[error("authentication required")]
    Unauthenticated,
    #[error("{0}")]
    Conflict(String),
    #[error("internal server error")]
    Internal(String),
}

impl HttpError {
    pub fn not_found(what: &str) -> Self {
        HttpError::NotFound(format!("{what} not found"))
    }

    fn category(&self) -> &'static str {
        match self {
            HttpError::Validation(_) => "validation",
            HttpError::NotFound(_) => "not_found",
            HttpError::Forbidden => "forbidden",
            HttpError::Unauthenticated => "unauthenticated",
            HttpError::Conflict(_) => "conflict",
            HttpError::Internal(_) => "server_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            HttpError::Validation(_) => StatusCode::BAD_REQUEST,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::Forbidden => StatusCode::FORBIDDEN,
            HttpError::Unauthenticated => StatusCode::UNAUTHORIZED,
            HttpError::Conflict(_) => StatusCode::CONFLICT,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        match value {
            AppError::Validation(msg) => HttpError::Validation(msg),
            err @ AppError::NotFound(_) => HttpError::NotFound(err.to_string()),
            AppError::Forbidden => HttpError::Forbidden,
            AppError::Unauthenticated => HttpError::Unauthenticated,
            AppError::Conflict(msg) => HttpError::Conflict(msg),
            AppError::Internal(err) => HttpError::Internal(format!("{err:#}")),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if let HttpError::Internal(detail) = &self {
            error!("request failed: {}", detail);
        }
        let body = ErrorBody {
            error: self.category(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
