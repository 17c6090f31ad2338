//! List Claimable Vouchers Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::prelude::*;

use crate::{
    extensions::*,
    state::State,
    vouchers::{into_status_error, responses::ClaimableVoucherResponse},
};

/// List Claimable Vouchers Handler
///
/// Active vouchers inside their validity window, flagged with whether the caller holds each.
#[endpoint(
    tags("vouchers"),
    summary = "List Claimable Vouchers",
    responses(
        (status_code = StatusCode::OK, description = "Claimable vouchers"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<Json<Vec<ClaimableVoucherResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let vouchers = state
        .app
        .vouchers
        .list_claimable(user, Timestamp::now())
        .await
        .map_err(into_status_error)?;

    Ok(Json(
        vouchers
            .into_iter()
            .map(ClaimableVoucherResponse::from)
            .collect(),
    ))
}
