//! Refund Errors

use salvo::http::StatusError;
use tracing::error;

use storefront::refunds::RefundError;
use storefront_app::domain::refunds::RefundsServiceError;

pub(crate) fn into_status_error(error: RefundsServiceError) -> StatusError {
    match error {
        RefundsServiceError::NotFound => {
            StatusError::not_found().brief("Refund request or purchase not found")
        }
        RefundsServiceError::Refund(
            conflict @ (RefundError::AlreadyRequested | RefundError::AlreadyDecided(_)),
        ) => StatusError::conflict().brief(conflict.to_string()),
        RefundsServiceError::Refund(RefundError::UnknownStatus(status)) => {
            error!("stored refund status {status:?} is not recognised");

            StatusError::internal_server_error()
        }
        RefundsServiceError::Refund(invalid) => {
            StatusError::bad_request().brief(invalid.to_string())
        }
        RefundsServiceError::InvalidReference
        | RefundsServiceError::MissingRequiredData
        | RefundsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid refund request")
        }
        RefundsServiceError::Wallet(source) => {
            error!("failed to credit refund: {source}");

            StatusError::internal_server_error()
        }
        RefundsServiceError::Sql(source) => {
            error!("failed to access refund requests: {source}");

            StatusError::internal_server_error()
        }
    }
}
