use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Offer token not recognized")]
    InvalidToken,

    #[error("Registration already processed")]
    AlreadyProcessed,

    #[error("Offer has expired; seat returned to inventory")]
    OfferExpired,

    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidToken
            | AppError::AlreadyProcessed
            | AppError::OfferExpired
            | AppError::PaymentGateway(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConfigError(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ConfigError(_) => "CONFIG_ERROR",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::AlreadyProcessed => "ALREADY_PROCESSED",
            AppError::OfferExpired => "OFFER_EXPIRED",
            AppError::PaymentGateway(_) => "PAYMENT_GATEWAY_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
            other => {
                error!(error = ?other, code = other.code(), "Request failed");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        // Store errors are not surfaced to clients verbatim.
        let public_message = match &self {
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
            other => other.to_string(),
        };

        error_response(code, public_message, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rejections_are_bad_requests() {
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::OfferExpired.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::AlreadyProcessed.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn database_errors_do_not_leak_details() {
        let err = AppError::DatabaseError(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "DATABASE_ERROR");
    }
}
