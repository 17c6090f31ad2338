//! Fail Top-Up Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use storefront_app::domain::wallets::records::WalletTransactionUuid;

use crate::{
    extensions::*,
    state::State,
    wallet::{into_status_error, responses::WalletTransactionResponse},
};

/// Fail Top-Up Handler
///
/// Marks a pending top-up as failed without touching the balance.
#[endpoint(
    tags("wallet"),
    summary = "Fail Top-Up",
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
        .fail_top_up(user, WalletTransactionUuid::from_uuid(top_up.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(transaction.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::domain::wallets::{
        WalletsServiceError,
        records::{
            WalletInstrument, WalletTransactionKind, WalletTransactionRecord,
            WalletTransactionStatus,
        },
    };

    use crate::test_helpers::{Mocks, TEST_USER, customer_service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        customer_service(
            mocks,
            Router::with_path("wallet/top-ups/{top_up}/fail").post(handler),
        )
    }

    #[tokio::test]
    async fn test_fail_top_up_returns_failed_transaction() -> TestResult {
        let uuid = WalletTransactionUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .wallets
            .expect_fail_top_up()
            .once()
            .withf(move |user, transaction| *user == TEST_USER && *transaction == uuid)
            .return_once(move |user, _| {
                Ok(WalletTransactionRecord {
                    uuid,
                    user,
                    amount: 5_000,
                    kind: WalletTransactionKind::TopUp,
                    instrument: WalletInstrument::EWallet,
                    status: WalletTransactionStatus::Failed,
                    payment_method: Some("paypal".to_string()),
                    description: None,
                    reference_id: format!("topup:{uuid}"),
                    created_at: Timestamp::UNIX_EPOCH,
                })
            });

        let mut res = TestClient::post(format!(
            "http://example.com/wallet/top-ups/{uuid}/fail"
        ))
        .send(&make_service(mocks))
        .await;

        let body: WalletTransactionResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.status, "failed");

        Ok(())
    }

    #[tokio::test]
    async fn test_settled_top_up_returns_409() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .wallets
            .expect_fail_top_up()
            .once()
            .return_once(|_, _| Err(WalletsServiceError::TopUpNotPending));

        let res = TestClient::post(format!(
            "http://example.com/wallet/top-ups/{}/fail",
            Uuid::now_v7()
        ))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
