//! Wallets service errors.

use rusty_money::MoneyError;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use storefront::wallet::WalletError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletsServiceError {
    #[error("wallet transaction already exists")]
    AlreadyExists,

    #[error("wallet not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("top-up is no longer pending")]
    TopUpNotPending,

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<MoneyError> for WalletsServiceError {
    fn from(error: MoneyError) -> Self {
        Self::Wallet(error.into())
    }
}

impl From<Error> for WalletsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
