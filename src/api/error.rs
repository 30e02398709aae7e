use axum::{
    Json,
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid API key")]
    Unauthorized,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Request body rejected: {0}")]
    Body(#[from] BytesRejection),

    #[error("Invalid image data: {0}")]
    Decode(String),

    #[error("Storage write failed: {0:#}")]
    StorageWrite(anyhow::Error),

    #[error("Metadata write failed: {0}")]
    MetadataWrite(#[from] sea_orm::DbErr),

    #[error("Timed out after {elapsed:?} while {operation}")]
    Timeout {
        operation: &'static str,
        elapsed: Duration,
    },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Body(rejection) => rejection.status(),
            AppError::BadRequest(_) | AppError::Decode(_) => StatusCode::BAD_REQUEST,
            AppError::StorageWrite(_) => StatusCode::BAD_GATEWAY,
            AppError::MetadataWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Unauthorized => "Invalid API key".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Body(rejection) => rejection.body_text(),
            AppError::Decode(_) => self.to_string(),
            AppError::StorageWrite(e) => {
                tracing::error!("Storage write error: {:?}", e);
                "Failed to store image".to_string()
            }
            AppError::MetadataWrite(e) => {
                tracing::error!("Metadata write error: {:?}", e);
                "Failed to record image metadata".to_string()
            }
            AppError::Timeout { operation, .. } => {
                tracing::error!("{}", self);
                format!("Timed out while {}", operation)
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
