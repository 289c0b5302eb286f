//! Mapping from storage errors to HTTP responses.

use crate::response::ApiResponse;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use temperature_db::DbError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Db(#[from] DbError),

    /// The request body, query string or path could not be decoded.
    #[error("{0}")]
    BadRequest(String),
}

impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        WebError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for WebError {
    fn from(rejection: QueryRejection) -> Self {
        WebError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for WebError {
    fn from(rejection: PathRejection) -> Self {
        WebError::BadRequest(rejection.body_text())
    }
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Db(DbError::NotFound { .. }) => StatusCode::NOT_FOUND,
            WebError::Db(DbError::InvalidPage(_)) => StatusCode::NOT_FOUND,
            WebError::Db(DbError::Duplicate(_)) => StatusCode::CONFLICT,
            WebError::Db(DbError::Validation(_)) => StatusCode::BAD_REQUEST,
            WebError::Db(DbError::Sqlx(_) | DbError::Migrate(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to clients; internal failures are not detailed.
    pub fn public_message(&self) -> String {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
            "An internal server error occurred".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ApiResponse::error(self.public_message()))).into_response()
    }
}
