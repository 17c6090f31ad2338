//! Complete Internally Handler

use std::sync::Arc;

use salvo::prelude::*;

use storefront::allocation::PaymentMethod;

use crate::{
    checkout::{responses::SettlementResponse, settlement_response},
    extensions::*,
    state::State,
};

/// Complete Internally Handler
///
/// Settles an order that store credit and e-wallet fully cover.
#[endpoint(
    tags("checkout"),
    summary = "Complete Internally",
    responses(
        (status_code = StatusCode::OK, description = "Purchase settled"),
        (status_code = StatusCode::BAD_REQUEST, description = "Order still needs a payment gateway"),
        (status_code = StatusCode::NOT_FOUND, description = "No checkout in progress"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<SettlementResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let result = state.app.checkout.complete_internally(user).await;

    settlement_response(PaymentMethod::StoreCreditAndWallet, result)
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::{
        checkout::{CheckoutError, settlement::Settlement},
        domain::purchases::records::PurchaseUuid,
    };

    use crate::test_helpers::{Mocks, TEST_USER, customer_service, make_purchase};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        customer_service(mocks, Router::with_path("checkout/internal").post(handler))
    }

    #[tokio::test]
    async fn test_internal_checkout_settles() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_complete_internally()
            .once()
            .withf(|user| *user == TEST_USER)
            .return_once(|_| {
                let mut purchase = make_purchase(PurchaseUuid::new());
                purchase.payment_method = PaymentMethod::StoreCreditAndWallet;
                purchase.e_wallet_used = purchase.total;
                purchase.total = 0;
                purchase.points_earned = 0;

                Ok(Settlement {
                    purchase,
                    replayed: false,
                })
            });

        let mut res = TestClient::post("http://example.com/checkout/internal")
            .send(&make_service(mocks))
            .await;

        let body: SettlementResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.purchase.payment_method, "store_credit_and_wallet");
        assert_eq!(body.purchase.total, "0.00");
        assert_eq!(body.purchase.e_wallet_used, "58.50");

        Ok(())
    }

    #[tokio::test]
    async fn test_gateway_amount_outstanding_returns_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.checkout.expect_complete_internally().once().return_once(|_| {
            Err(CheckoutError::GatewayRequired {
                remaining: "77.00".to_string(),
            })
        });

        let res = TestClient::post("http://example.com/checkout/internal")
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
