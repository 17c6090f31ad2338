//! Convert Points Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    state::State,
    wallet::{into_status_error, responses::WalletResponse},
};

/// Convert Points Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ConvertPointsRequest {
    /// A positive multiple of 100
    pub points: i64,
}

/// Convert Points Handler
///
/// Every 100 points become $1.00 of store credit.
#[endpoint(
    tags("wallet"),
    summary = "Convert Points",
    responses(
        (status_code = StatusCode::OK, description = "Balances after conversion"),
        (status_code = StatusCode::BAD_REQUEST, description = "Points are not a positive multiple of 100"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Insufficient points"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ConvertPointsRequest>,
    depot: &mut Depot,
) -> Result<Json<WalletResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let wallet = state
        .app
        .wallets
        .convert_points(user, json.into_inner().points)
        .await
        .map_err(into_status_error)?;

    Ok(Json(wallet.into()))
}
