//! Begin Top-Up Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use storefront_app::domain::wallets::data::NewTopUp;

use crate::{
    amounts,
    extensions::*,
    state::State,
    wallet::{into_status_error, responses::WalletTransactionResponse},
};

/// Top-Up Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TopUpRequest {
    /// Decimal amount, e.g. `"50.00"`
    pub amount: String,

    /// How the customer will pay for the top-up
    pub payment_method: String,
}

/// Begin Top-Up Handler
///
/// Records a pending e-wallet top-up. The balance is credited once the top-up is confirmed.
#[endpoint(
    tags("wallet"),
    summary = "Begin Top-Up",
    responses(
        (status_code = StatusCode::CREATED, description = "Pending top-up recorded"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<TopUpRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<WalletTransactionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let request = json.into_inner();

    if request.payment_method.trim().is_empty() {
        return Err(StatusError::bad_request().brief("payment_method is required"));
    }

    let top_up = NewTopUp {
        amount: amounts::parse("amount", &request.amount)?,
        payment_method: request.payment_method,
    };

    let transaction = state
        .app
        .wallets
        .begin_top_up(user, top_up)
        .await
        .map_err(into_status_error)?;

    res.add_header(
        LOCATION,
        format!("/wallet/top-ups/{}", transaction.uuid),
        true,
    )
    .or_500("failed to set location header")?
    .status_code(StatusCode::CREATED);

    Ok(Json(transaction.into()))
}
