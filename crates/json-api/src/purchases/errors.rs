//! Purchase Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::{carts::CartsServiceError, purchases::PurchasesServiceError};

pub(crate) fn into_status_error(error: PurchasesServiceError) -> StatusError {
    match error {
        PurchasesServiceError::NotFound => StatusError::not_found().brief("Purchase not found"),
        PurchasesServiceError::AlreadyExists => {
            StatusError::conflict().brief("Purchase already exists")
        }
        PurchasesServiceError::InvalidReference
        | PurchasesServiceError::MissingRequiredData
        | PurchasesServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid purchase data")
        }
        PurchasesServiceError::Cart(CartsServiceError::NotFound) => {
            StatusError::not_found().brief("Product is no longer available")
        }
        PurchasesServiceError::Cart(source) => {
            error!("failed to update cart from purchase: {source}");

            StatusError::internal_server_error()
        }
        PurchasesServiceError::Sql(source) => {
            error!("failed to read purchases: {source}");

            StatusError::internal_server_error()
        }
    }
}
