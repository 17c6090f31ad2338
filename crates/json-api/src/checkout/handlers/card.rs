//! Pay By Card Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use storefront::{allocation::PaymentMethod, cards::CardDetails};

use crate::{
    checkout::{responses::SettlementResponse, settlement_response},
    extensions::*,
    state::State,
};

/// Card Request
#[derive(Deserialize, Serialize, ToSchema)]
pub(crate) struct CardRequest {
    pub holder_name: String,

    /// Card number, optionally grouped with spaces or dashes
    pub number: String,

    /// `MM/YY` or `MM/YYYY`
    pub expiry: String,

    pub cvv: String,
}

impl From<CardRequest> for CardDetails {
    fn from(request: CardRequest) -> Self {
        CardDetails {
            holder_name: request.holder_name,
            number: request.number,
            expiry: request.expiry,
            cvv: request.cvv,
        }
    }
}

/// Pay By Card Handler
///
/// Validates the card and settles the checkout immediately. Retrying a settled checkout
/// returns the existing purchase with `replayed` set.
#[endpoint(
    tags("checkout"),
    summary = "Pay By Card",
    responses(
        (status_code = StatusCode::OK, description = "Purchase settled"),
        (status_code = StatusCode::BAD_REQUEST, description = "Card details are invalid"),
        (status_code = StatusCode::NOT_FOUND, description = "No checkout in progress"),
        (status_code = StatusCode::CONFLICT, description = "Checkout is already being settled"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CardRequest>,
    depot: &mut Depot,
) -> Result<Json<SettlementResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let result = state
        .app
        .checkout
        .pay_by_card(user, json.into_inner().into())
        .await;

    settlement_response(PaymentMethod::Card, result)
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use storefront::cards::CardError;
    use storefront_app::{
        checkout::{CheckoutError, settlement::Settlement},
        domain::purchases::records::PurchaseUuid,
    };

    use crate::test_helpers::{Mocks, TEST_USER, customer_service, make_purchase};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        customer_service(mocks, Router::with_path("checkout/card").post(handler))
    }

    fn card() -> Value {
        json!({
            "holder_name": "Tan Ah Kow",
            "number": "4111 1111 1111 1111",
            "expiry": "12/99",
            "cvv": "123",
        })
    }

    #[tokio::test]
    async fn test_card_payment_settles_purchase() -> TestResult {
        let uuid = PurchaseUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_pay_by_card()
            .once()
            .withf(|user, card| *user == TEST_USER && card.number == "4111 1111 1111 1111")
            .return_once(move |_, _| {
                Ok(Settlement {
                    purchase: make_purchase(uuid),
                    replayed: false,
                })
            });

        let mut res = TestClient::post("http://example.com/checkout/card")
            .json(&card())
            .send(&make_service(mocks))
            .await;

        let body: SettlementResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.purchase.uuid, uuid.into_uuid());
        assert!(!body.replayed);

        Ok(())
    }

    #[tokio::test]
    async fn test_replayed_settlement_returns_existing_purchase() -> TestResult {
        let uuid = PurchaseUuid::new();
        let mut mocks = Mocks::default();

        mocks.checkout.expect_pay_by_card().once().return_once(move |_, _| {
            Ok(Settlement {
                purchase: make_purchase(uuid),
                replayed: true,
            })
        });

        let mut res = TestClient::post("http://example.com/checkout/card")
            .json(&card())
            .send(&make_service(mocks))
            .await;

        let body: SettlementResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.purchase.uuid, uuid.into_uuid());
        assert!(body.replayed);

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_card_returns_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_pay_by_card()
            .once()
            .return_once(|_, _| Err(CheckoutError::Card(CardError::InvalidNumber)));

        let res = TestClient::post("http://example.com/checkout/card")
            .json(&card())
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_without_checkout_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_pay_by_card()
            .once()
            .return_once(|_, _| Err(CheckoutError::NoSession));

        let res = TestClient::post("http://example.com/checkout/card")
            .json(&card())
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
