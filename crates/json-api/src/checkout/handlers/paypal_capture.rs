//! Capture PayPal Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use storefront::allocation::PaymentMethod;

use crate::{
    checkout::{responses::SettlementResponse, settlement_response},
    extensions::*,
    state::State,
};

/// Capture PayPal Order Handler
///
/// Captures an order the customer approved and settles the checkout. A failed capture
/// discards the checkout.
#[endpoint(
    tags("checkout"),
    summary = "Capture PayPal Order",
    responses(
        (status_code = StatusCode::OK, description = "Purchase settled"),
        (status_code = StatusCode::NOT_FOUND, description = "No checkout in progress"),
        (status_code = StatusCode::CONFLICT, description = "Order does not match the checkout"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Capture failed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order_id: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<SettlementResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let result = state
        .app
        .checkout
        .capture_redirect_order(user, order_id.into_inner())
        .await;

    settlement_response(PaymentMethod::PayPal, result)
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
        customer_service(
            mocks,
            Router::with_path("checkout/paypal/orders/{order_id}/capture").post(handler),
        )
    }

    #[tokio::test]
    async fn test_capture_settles_purchase() -> TestResult {
        let uuid = PurchaseUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_capture_redirect_order()
            .once()
            .withf(|user, order| *user == TEST_USER && order == "5O190127TN364715T")
            .return_once(move |_, order| {
                let mut purchase = make_purchase(uuid);
                purchase.payment_method = PaymentMethod::PayPal;
                purchase.gateway_reference = format!("paypal:{order}");

                Ok(Settlement {
                    purchase,
                    replayed: false,
                })
            });

        let mut res = TestClient::post(
            "http://example.com/checkout/paypal/orders/5O190127TN364715T/capture",
        )
        .send(&make_service(mocks))
        .await;

        let body: SettlementResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.purchase.payment_method, "paypal");

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_capture_returns_502() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_capture_redirect_order()
            .once()
            .return_once(|_, _| Err(CheckoutError::CaptureFailed("DECLINED".to_string())));

        let res = TestClient::post("http://example.com/checkout/paypal/orders/ORDER-1/capture")
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_GATEWAY));

        Ok(())
    }

    #[tokio::test]
    async fn test_mismatched_order_returns_409() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_capture_redirect_order()
            .once()
            .return_once(|_, _| Err(CheckoutError::FlowMismatch));

        let res = TestClient::post("http://example.com/checkout/paypal/orders/OTHER/capture")
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
