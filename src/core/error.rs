use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A remote collaborator (vision model, blob storage) could not serve the request
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DependencyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                ("Database error occurred".to_string(), None)
            }
            AppError::NotFound(msg) | AppError::BadRequest(msg) => (msg, None),
            AppError::Validation(msg) => (msg.clone(), Some(vec![msg])),
            AppError::DependencyUnavailable(ref msg) => {
                tracing::error!("Dependency unavailable: {}", msg);
                (
                    "Service temporarily unavailable, please try again later".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorResponse::new(message, errors))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
