//! List Wallet Transactions Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    state::State,
    wallet::{
        into_status_error,
        responses::{PointsTransactionResponse, WalletTransactionResponse},
    },
};

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 200;

/// Wallet History Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WalletHistoryResponse {
    /// E-wallet and store credit movements, newest first
    pub transactions: Vec<WalletTransactionResponse>,

    /// Points movements, newest first
    pub points: Vec<PointsTransactionResponse>,
}

/// List Wallet Transactions Handler
#[endpoint(
    tags("wallet"),
    summary = "List Wallet Transactions",
    responses(
        (status_code = StatusCode::OK, description = "Wallet history"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    limit: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<WalletHistoryResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let limit = limit.into_inner().unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let transactions = state
        .app
        .wallets
        .list_transactions(user, limit)
        .await
        .map_err(into_status_error)?;

    let points = state
        .app
        .wallets
        .list_points_transactions(user, limit)
        .await
        .map_err(into_status_error)?;

    Ok(Json(WalletHistoryResponse {
        transactions: transactions
            .into_iter()
            .map(WalletTransactionResponse::from)
            .collect(),
        points: points
            .into_iter()
            .map(PointsTransactionResponse::from)
            .collect(),
    }))
}
