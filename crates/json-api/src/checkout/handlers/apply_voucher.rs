//! Apply Voucher Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    checkout::{
        into_status_error,
        responses::{CheckoutResponse, checkout_response},
    },
    extensions::*,
    state::State,
};

/// Apply Voucher Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyVoucherRequest {
    /// Code of a voucher the caller has claimed
    pub code: String,
}

/// Apply Voucher Handler
///
/// Replaces any voucher already applied and re-allocates the discounted total.
#[endpoint(
    tags("checkout"),
    summary = "Apply Voucher",
    responses(
        (status_code = StatusCode::OK, description = "Voucher applied"),
        (status_code = StatusCode::NOT_FOUND, description = "No checkout in progress"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Voucher rejected"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ApplyVoucherRequest>,
    depot: &mut Depot,
) -> Result<Json<CheckoutResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let code = json.into_inner().code;

    if code.trim().is_empty() {
        return Err(StatusError::bad_request().brief("code is required"));
    }

    let session = state
        .app
        .checkout
        .apply_voucher(user, code)
        .await
        .map_err(into_status_error)?;

    checkout_response(session)
}
