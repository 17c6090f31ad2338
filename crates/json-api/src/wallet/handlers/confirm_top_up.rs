//! Confirm Top-Up Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use storefront_app::domain::wallets::records::WalletTransactionUuid;

use crate::{
    extensions::*,
    state::State,
    wallet::{into_status_error, responses::WalletTransactionResponse},
};

/// Confirm Top-Up Handler
///
/// Completes a pending top-up and credits the e-wallet exactly once.
#[endpoint(
    tags("wallet"),
    summary = "Confirm Top-Up",
    responses(
        (status_code = StatusCode::OK, description = "Top-up"),
        (status_code = StatusCode::NOT_FOUND, description = "Top-up not found"),
        (status_code = StatusCode::CONFLICT, description = "Top-up is no longer pending"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    top_up: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<WalletTransactionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let transaction = state
        .app
        .wallets
        .confirm_top_up(user, WalletTransactionUuid::from_uuid(top_up.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(transaction.into()))
}
