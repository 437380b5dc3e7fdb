use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Field-level rule violations on a subscription or a period query.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Price must not be negative")]
    NegativePrice,

    #[error("Date must be in MM-YYYY format with a year of 2000 or later")]
    InvalidDateFormat,

    #[error("End date must not be earlier than start date")]
    DateOrderViolation,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::NegativePrice => "NEGATIVE_PRICE",
            ValidationError::InvalidDateFormat => "INVALID_DATE_FORMAT",
            ValidationError::DateOrderViolation => "DATE_ORDER_VIOLATION",
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Validation(v) => v.code(),
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ConfigError(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::InvalidInput(msg) => {
                log::warn!("Invalid input: {msg}");
                msg.clone()
            }
            AppError::Validation(err) => {
                log::warn!("Validation error: {err}");
                err.to_string()
            }
            AppError::NotFound(msg) => {
                log::warn!("Not found: {msg}");
                msg.clone()
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Database error".to_string()
            }
            _ => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": message
            }
        }))
    }
}
