use service_core::error::AppError;
use thiserror::Error;

use crate::services::policy::Operation;
use crate::services::store::StoreError;
use crate::services::TokenError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Account number already exists")]
    AccountNumberExists,

    #[error("User not found")]
    AccountNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Permission denied: cannot {}", .0.describe())]
    PermissionDenied(Operation),

    #[error("Payment not found")]
    PaymentNotFound,

    #[error("Payment has already been {0}")]
    AlreadyDecided(&'static str),

    #[error("{0}")]
    Token(#[from] TokenError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => ServiceError::AccountNumberExists,
            other => ServiceError::Store(other),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Store(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::AccountNumberExists | ServiceError::InvalidRole(_) => {
                AppError::BadRequest(anyhow::anyhow!(message))
            }
            ServiceError::AccountNotFound | ServiceError::PaymentNotFound => {
                AppError::NotFound(anyhow::anyhow!(message))
            }
            ServiceError::InvalidCredentials | ServiceError::Token(_) => {
                AppError::Unauthorized(anyhow::anyhow!(message))
            }
            ServiceError::PermissionDenied(_) => AppError::Forbidden(anyhow::anyhow!(message)),
            ServiceError::AlreadyDecided(_) => AppError::Conflict(anyhow::anyhow!(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    fn status(err: ServiceError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn maps_domain_errors_to_statuses() {
        assert_eq!(status(ServiceError::AccountNumberExists), StatusCode::BAD_REQUEST);
        assert_eq!(status(ServiceError::AccountNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status(ServiceError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status(ServiceError::PermissionDenied(Operation::ListAllPayments)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status(ServiceError::AlreadyDecided("approved")), StatusCode::CONFLICT);
        assert_eq!(status(ServiceError::Token(TokenError::Expired)), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn duplicate_key_becomes_account_number_exists() {
        let err = ServiceError::from(StoreError::Duplicate("account_number".to_string()));
        assert!(matches!(err, ServiceError::AccountNumberExists));
        assert_eq!(err.to_string(), "Account number already exists");
    }
}
