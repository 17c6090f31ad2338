//! Request Refund Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::purchases::records::PurchaseUuid;

use crate::{
    extensions::*,
    refunds::{into_status_error, responses::RefundRequestResponse},
    state::State,
};

/// Refund Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateRefundRequest {
    pub reason: String,
}

/// Request Refund Handler
///
/// A purchase may have one open or approved request at a time. A rejected request may be
/// followed by a new one.
#[endpoint(
    tags("refunds"),
    summary = "Request Refund",
    responses(
        (status_code = StatusCode::CREATED, description = "Refund requested"),
        (status_code = StatusCode::BAD_REQUEST, description = "Reason is required"),
        (status_code = StatusCode::NOT_FOUND, description = "Purchase not found"),
        (status_code = StatusCode::CONFLICT, description = "A refund request already exists"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    purchase: PathParam<Uuid>,
    json: JsonBody<CreateRefundRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<RefundRequestResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let request = state
        .app
        .refunds
        .request_refund(
            user,
            PurchaseUuid::from_uuid(purchase.into_inner()),
            json.into_inner().reason,
        )
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(request.into()))
}
