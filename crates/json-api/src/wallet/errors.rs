//! Wallet Errors

use salvo::http::StatusError;
use tracing::error;

use storefront::wallet::{PointsRejection, WalletError};
use storefront_app::domain::wallets::WalletsServiceError;

pub(crate) fn into_status_error(error: WalletsServiceError) -> StatusError {
    match error {
        WalletsServiceError::NotFound => StatusError::not_found().brief("Wallet not found"),
        WalletsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Wallet transaction already exists")
        }
        WalletsServiceError::TopUpNotPending => {
            StatusError::conflict().brief("Top-up is no longer pending")
        }
        WalletsServiceError::InvalidReference
        | WalletsServiceError::MissingRequiredData
        | WalletsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid wallet data")
        }
        WalletsServiceError::Wallet(error) => wallet_rule_error(error),
        WalletsServiceError::Sql(source) => {
            error!("failed to access wallet: {source}");

            StatusError::internal_server_error()
        }
    }
}

fn wallet_rule_error(error: WalletError) -> StatusError {
    match error {
        WalletError::InsufficientPoints(rejection @ PointsRejection::ExceedsBalance { .. }) => {
            StatusError::unprocessable_entity().brief(rejection.to_string())
        }
        WalletError::InsufficientPoints(rejection) => {
            StatusError::bad_request().brief(rejection.to_string())
        }
        WalletError::InvalidTopUp(rejection) => {
            StatusError::bad_request().brief(rejection.to_string())
        }
        insufficient @ WalletError::InsufficientFunds { .. } => {
            StatusError::unprocessable_entity().brief(insufficient.to_string())
        }
        WalletError::Amount(source) => {
            error!("wallet arithmetic failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
