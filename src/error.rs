//! Error types surfaced over HTTP

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

use crate::api::responses::ErrorResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Failed to lock {0} registry")]
    LockPoisoned(&'static str),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::LockPoisoned(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
