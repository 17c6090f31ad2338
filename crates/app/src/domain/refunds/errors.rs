//! Refunds service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use storefront::refunds::RefundError;
use thiserror::Error;

use crate::domain::wallets::WalletsServiceError;

#[derive(Debug, Error)]
pub enum RefundsServiceError {
    #[error("refund request or purchase not found")]
    NotFound,

    #[error(transparent)]
    Refund(#[from] RefundError),

    #[error("failed to credit store credit")]
    Wallet(#[from] WalletsServiceError),

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for RefundsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::Refund(RefundError::AlreadyRequested),
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
