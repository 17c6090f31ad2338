//! Refund Queue Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use storefront::refunds::RefundStatus;

use crate::{
    extensions::*,
    refunds::{into_status_error, responses::RefundRequestResponse},
    state::State,
};

/// Refund Queue Handler
///
/// Requests across all customers, optionally filtered by `status`.
#[endpoint(
    tags("admin"),
    summary = "Refund Queue",
    responses(
        (status_code = StatusCode::OK, description = "Refund requests"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin access required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<Vec<RefundRequestResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.admin_or_403()?;

    let status = status
        .into_inner()
        .map(|value| value.parse::<RefundStatus>())
        .transpose()
        .or_400()?;

    let requests = state
        .app
        .refunds
        .list(status)
        .await
        .map_err(into_status_error)?;

    Ok(Json(
        requests
            .into_iter()
            .map(RefundRequestResponse::from)
            .collect(),
    ))
}
