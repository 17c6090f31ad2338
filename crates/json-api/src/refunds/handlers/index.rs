//! List Refund Requests Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    refunds::{into_status_error, responses::RefundRequestResponse},
    state::State,
};

/// List Refund Requests Handler
///
/// The caller's refund requests, newest first.
#[endpoint(
    tags("refunds"),
    summary = "List Refund Requests",
    responses(
        (status_code = StatusCode::OK, description = "Refund requests"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<Json<Vec<RefundRequestResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let requests = state
        .app
        .refunds
        .list_for_user(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(
        requests
            .into_iter()
            .map(RefundRequestResponse::from)
            .collect(),
    ))
}
