//! Claim Voucher Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use storefront_app::domain::vouchers::records::VoucherUuid;

use crate::{
    extensions::*,
    state::State,
    vouchers::{into_status_error, responses::VoucherClaimResponse},
};

/// Claim Voucher Handler
#[endpoint(
    tags("vouchers"),
    summary = "Claim Voucher",
    responses(
        (status_code = StatusCode::CREATED, description = "Voucher claimed"),
        (status_code = StatusCode::NOT_FOUND, description = "Voucher not found"),
        (status_code = StatusCode::CONFLICT, description = "Voucher already claimed"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Voucher is not available to claim"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    voucher: PathParam<Uuid>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<VoucherClaimResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let claim = state
        .app
        .vouchers
        .claim(
            user,
            VoucherUuid::from_uuid(voucher.into_inner()),
            Timestamp::now(),
        )
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(claim.into()))
}
