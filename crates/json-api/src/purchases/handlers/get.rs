//! Get Purchase Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use storefront_app::domain::purchases::records::PurchaseUuid;

use crate::{
    extensions::*,
    purchases::{into_status_error, responses::PurchaseResponse},
    state::State,
};

/// Get Purchase Handler
///
/// Returns one of the caller's purchases with its lines.
#[endpoint(
    tags("purchases"),
    summary = "Get Purchase",
    responses(
        (status_code = StatusCode::OK, description = "Purchase"),
        (status_code = StatusCode::NOT_FOUND, description = "Purchase not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    purchase: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PurchaseResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let purchase = state
        .app
        .purchases
        .get_purchase(Some(user), PurchaseUuid::from_uuid(purchase.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(purchase.into()))
}
