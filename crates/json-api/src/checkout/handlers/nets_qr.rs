//! Request NETS QR Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use storefront_app::gateways::QrCode;

use crate::{checkout::into_status_error, extensions::*, state::State};

/// QR Code Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct QrCodeResponse {
    /// Reference used to follow the payment
    pub txn_retrieval_ref: String,

    /// Base64 encoded PNG
    pub qr_code: String,

    /// Server-sent events stream reporting the payment status
    pub events_url: String,
}

impl From<QrCode> for QrCodeResponse {
    fn from(code: QrCode) -> Self {
        Self {
            events_url: format!("/checkout/nets/qr/{}/events", code.txn_retrieval_ref),
            txn_retrieval_ref: code.txn_retrieval_ref,
            qr_code: code.qr_code,
        }
    }
}

/// Request NETS QR Handler
///
/// Issues a QR code for the amount store credit and e-wallet leave uncovered.
#[endpoint(
    tags("checkout"),
    summary = "Request NETS QR",
    responses(
        (status_code = StatusCode::OK, description = "QR code issued"),
        (status_code = StatusCode::BAD_REQUEST, description = "Nothing left to charge"),
        (status_code = StatusCode::NOT_FOUND, description = "No checkout in progress"),
        (status_code = StatusCode::BAD_GATEWAY, description = "QR request failed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<QrCodeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let code = state
        .app
        .checkout
        .request_qr(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(code.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::checkout::CheckoutError;

    use crate::test_helpers::{Mocks, TEST_USER, customer_service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        customer_service(mocks, Router::with_path("checkout/nets/qr").post(handler))
    }

    #[tokio::test]
    async fn test_request_qr_returns_code_and_events_url() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_request_qr()
            .once()
            .withf(|user| *user == TEST_USER)
            .return_once(|_| {
                Ok(QrCode {
                    txn_retrieval_ref: "9cbc7b5a-ref".to_string(),
                    qr_code: "iVBORw0KGgo=".to_string(),
                })
            });

        let mut res = TestClient::post("http://example.com/checkout/nets/qr")
            .send(&make_service(mocks))
            .await;

        let body: QrCodeResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.events_url, "/checkout/nets/qr/9cbc7b5a-ref/events");
        assert_eq!(body.qr_code, "iVBORw0KGgo=");

        Ok(())
    }

    #[tokio::test]
    async fn test_gateway_rejection_returns_502() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_request_qr()
            .once()
            .return_once(|_| Err(CheckoutError::QrFailed("response code 68".to_string())));

        let res = TestClient::post("http://example.com/checkout/nets/qr")
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_GATEWAY));

        Ok(())
    }
}
