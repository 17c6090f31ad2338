//! Begin Checkout Handler

use std::sync::Arc;

use rusty_money::{Money, iso::Currency};
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use storefront::allocation::UsageRequest;

use crate::{
    amounts,
    checkout::{
        into_status_error,
        responses::{CheckoutResponse, checkout_response},
    },
    extensions::*,
    state::State,
};

/// Begin Checkout Request
///
/// Omit an instrument to leave it unused. Amounts are upper bounds; no more than the balance
/// held is ever used.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct BeginCheckoutRequest {
    /// Store credit to apply, e.g. `"10.00"`
    #[serde(default)]
    pub store_credit: Option<String>,

    /// E-wallet balance to apply
    #[serde(default)]
    pub e_wallet: Option<String>,
}

fn usage_amount(
    field: &str,
    value: Option<&str>,
) -> Result<Option<Money<'static, Currency>>, StatusError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let amount = amounts::parse(field, value)?;

    if amount.is_negative() {
        return Err(StatusError::bad_request().brief(format!("{field}: must not be negative")));
    }

    Ok(Some(amount))
}

impl BeginCheckoutRequest {
    fn into_usage(self) -> Result<UsageRequest<'static>, StatusError> {
        Ok(UsageRequest {
            store_credit: usage_amount("store_credit", self.store_credit.as_deref())?,
            e_wallet: usage_amount("e_wallet", self.e_wallet.as_deref())?,
        })
    }
}

/// Begin Checkout Handler
///
/// Prices the cart, snapshots it and allocates the total across store credit, e-wallet and
/// the amount left for a payment gateway. Starting again replaces an idle checkout.
#[endpoint(
    tags("checkout"),
    summary = "Begin Checkout",
    responses(
        (status_code = StatusCode::OK, description = "Checkout started"),
        (status_code = StatusCode::BAD_REQUEST, description = "Cart is empty or amounts are malformed"),
        (status_code = StatusCode::CONFLICT, description = "Checkout is already being settled"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<BeginCheckoutRequest>,
    depot: &mut Depot,
) -> Result<Json<CheckoutResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let usage = json.into_inner().into_usage()?;

    let session = state
        .app
        .checkout
        .begin(user, usage)
        .await
        .map_err(into_status_error)?;

    checkout_response(session)
}
