//! Checkout Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use storefront::vouchers::VoucherError;
use storefront_app::{checkout::CheckoutError, domain::vouchers::VouchersServiceError};

use crate::{carts, purchases, vouchers, wallet};

pub(crate) fn into_status_error(error: CheckoutError) -> StatusError {
    match error {
        CheckoutError::NoSession => StatusError::not_found().brief("No checkout in progress"),
        CheckoutError::InProgress
        | CheckoutError::PaymentPending
        | CheckoutError::FlowMismatch => {
            StatusError::conflict().brief(error.to_string())
        }
        CheckoutError::EmptyCart => StatusError::bad_request().brief("Cart is empty"),
        CheckoutError::GatewayRequired { .. } | CheckoutError::NothingToCharge => {
            StatusError::bad_request().brief(error.to_string())
        }
        CheckoutError::Card(rejection) => StatusError::bad_request().brief(rejection.to_string()),
        CheckoutError::Voucher(VoucherError::Rejected(rejection)) => {
            StatusError::unprocessable_entity().brief(rejection.to_string())
        }
        CheckoutError::VoucherClaim(VouchersServiceError::NotFound) => {
            StatusError::unprocessable_entity().brief("No unused claim for this voucher code")
        }
        CheckoutError::VoucherClaim(source) => vouchers::into_status_error(source),
        CheckoutError::Declined(_) | CheckoutError::CaptureFailed(_) | CheckoutError::QrFailed(_) => {
            warn!("payment failed: {error}");

            StatusError::bad_gateway().brief(error.to_string())
        }
        CheckoutError::Gateway(source) => {
            error!("payment gateway error: {source}");

            StatusError::bad_gateway().brief("Payment gateway error")
        }
        CheckoutError::Voucher(_)
        | CheckoutError::Pricing(_)
        | CheckoutError::Allocation(_)
        | CheckoutError::Receipt(_) => {
            error!("failed to compute checkout: {error}");

            StatusError::internal_server_error()
        }
        CheckoutError::Carts(source) => carts::into_status_error(source),
        CheckoutError::Wallets(source) => wallet::into_status_error(source),
        CheckoutError::Purchases(source) => purchases::into_status_error(source),
    }
}
