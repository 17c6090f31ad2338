//! Voucher Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::vouchers::VouchersServiceError;

pub(crate) fn into_status_error(error: VouchersServiceError) -> StatusError {
    match error {
        VouchersServiceError::NotFound => StatusError::not_found().brief("Voucher not found"),
        VouchersServiceError::AlreadyExists => {
            StatusError::conflict().brief("Voucher code already exists")
        }
        VouchersServiceError::AlreadyClaimed => {
            StatusError::conflict().brief("Voucher already claimed")
        }
        VouchersServiceError::AlreadyUsed => StatusError::conflict().brief("Voucher already used"),
        VouchersServiceError::NotClaimable => {
            StatusError::unprocessable_entity().brief("Voucher is not available to claim")
        }
        VouchersServiceError::InvalidVoucher(reason) => StatusError::bad_request().brief(reason),
        VouchersServiceError::InvalidReference
        | VouchersServiceError::MissingRequiredData
        | VouchersServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid voucher data")
        }
        VouchersServiceError::Sql(source) => {
            error!("failed to access vouchers: {source}");

            StatusError::internal_server_error()
        }
    }
}
