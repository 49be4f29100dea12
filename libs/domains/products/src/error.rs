use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use sea_orm::DbErr;
use thiserror::Error;

use crate::models::{FieldError, join_field_errors};

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Failed to decode product data: {0}")]
    Decode(String),

    #[error("Missing product ID")]
    MissingId,

    #[error("Invalid product ID: {0}")]
    InvalidId(String),

    #[error("{}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("Product not found: {0}")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    /// Translate into the HTTP error contract.
    ///
    /// `failure` is the client-facing message for storage failures; the raw
    /// cause is logged and never returned.
    pub fn into_app_error(self, failure: &str) -> AppError {
        match self {
            ProductError::Decode(cause) => {
                tracing::debug!(%cause, "Rejected product body");
                AppError::JsonExtraction("Failed to decode product data".to_string())
            }
            ProductError::MissingId => AppError::InvalidId("Missing product ID".to_string()),
            ProductError::InvalidId(_) => AppError::InvalidId("Invalid product ID".to_string()),
            ProductError::Validation(errors) => AppError::ValidationFailed {
                message: join_field_errors(&errors),
                details: serde_json::to_value(&errors).unwrap_or_default(),
            },
            ProductError::NotFound(_) => AppError::NotFound("Product not found".to_string()),
            ProductError::Storage(cause) => {
                tracing::error!(%cause, "{}", failure);
                AppError::InternalServerError(failure.to_string())
            }
        }
    }
}

impl From<DbErr> for ProductError {
    fn from(err: DbErr) -> Self {
        ProductError::Storage(err.to_string())
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        err.into_app_error(ErrorCode::InternalError.default_message())
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
