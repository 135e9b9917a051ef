//! HTTP error responses.

use api_shared::{BearerError, ErrorRes};
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mw_core::MiddlewareError;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// An error rendered as `{"error": "<message>"}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// A 500 whose detail goes to the log, not to the client.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        tracing::error!("internal error: {err}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorRes {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<MiddlewareError> for ApiError {
    fn from(err: MiddlewareError) -> Self {
        use MiddlewareError as E;

        match err {
            E::InvalidInput(msg) => Self::bad_request(msg),
            E::Text(e) => Self::bad_request(e.to_string()),
            E::NotFound => Self::not_found(err.to_string()),
            E::AccessDenied => Self::new(StatusCode::FORBIDDEN, err.to_string()),
            E::UsernameExists | E::EmailExists | E::EmployeeIdExists => {
                Self::new(StatusCode::CONFLICT, err.to_string())
            }
            E::InvalidCredentials | E::InvalidToken => Self::unauthorized(err.to_string()),
            E::Database(_)
            | E::PasswordHash(_)
            | E::Token(_)
            | E::BlockingTask(_)
            | E::HttpClient(_) => Self::internal(err),
        }
    }
}

impl From<BearerError> for ApiError {
    fn from(err: BearerError) -> Self {
        Self::unauthorized(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}
