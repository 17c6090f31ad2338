//! Create PayPal Order Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use storefront_app::gateways::RedirectOrder;

use crate::{checkout::into_status_error, extensions::*, state::State};

/// PayPal Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PayPalOrderResponse {
    pub order_id: String,

    /// Where the customer approves the payment
    pub approve_url: Option<String>,
}

impl From<RedirectOrder> for PayPalOrderResponse {
    fn from(order: RedirectOrder) -> Self {
        Self {
            order_id: order.order_id,
            approve_url: order.approve_url,
        }
    }
}

/// Create PayPal Order Handler
///
/// Creates a gateway order for the amount store credit and e-wallet leave uncovered. The
/// allocation is frozen from this point until the order is captured.
#[endpoint(
    tags("checkout"),
    summary = "Create PayPal Order",
    responses(
        (status_code = StatusCode::OK, description = "Order created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Nothing left to charge"),
        (status_code = StatusCode::NOT_FOUND, description = "No checkout in progress"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment gateway error"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<PayPalOrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let order = state
        .app
        .checkout
        .create_redirect_order(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
