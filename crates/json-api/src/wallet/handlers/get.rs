//! Get Wallet Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    state::State,
    wallet::{into_status_error, responses::WalletResponse},
};

/// Get Wallet Handler
#[endpoint(
    tags("wallet"),
    summary = "Get Wallet",
    responses(
        (status_code = StatusCode::OK, description = "Balances"),
        (status_code = StatusCode::NOT_FOUND, description = "Wallet not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<WalletResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let wallet = state
        .app
        .wallets
        .get_wallet(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(wallet.into()))
}
