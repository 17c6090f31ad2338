//! Clear Voucher Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    checkout::{
        into_status_error,
        responses::{CheckoutResponse, checkout_response},
    },
    extensions::*,
    state::State,
};

/// Clear Voucher Handler
///
/// Restores the pre-voucher total and re-allocates it.
#[endpoint(
    tags("checkout"),
    summary = "Clear Voucher",
    responses(
        (status_code = StatusCode::OK, description = "Voucher removed"),
        (status_code = StatusCode::NOT_FOUND, description = "No checkout in progress"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CheckoutResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let session = state
        .app
        .checkout
        .clear_voucher(user)
        .await
        .map_err(into_status_error)?;

    checkout_response(session)
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::checkout::CheckoutError;

    use crate::test_helpers::{Mocks, TEST_USER, customer_service, make_session};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        customer_service(mocks, Router::with_path("checkout/voucher").delete(handler))
    }

    #[tokio::test]
    async fn test_clear_voucher_restores_total() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_clear_voucher()
            .once()
            .withf(|user| *user == TEST_USER)
            .return_once(|_| Ok(make_session()));

        let mut res = TestClient::delete("http://example.com/checkout/voucher")
            .send(&make_service(mocks))
            .await;

        let body: CheckoutResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.voucher_code, None);
        assert_eq!(body.voucher_discount, "0.00");
        assert_eq!(body.total, "107.00");

        Ok(())
    }

    #[tokio::test]
    async fn test_without_checkout_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_clear_voucher()
            .once()
            .return_once(|_| Err(CheckoutError::NoSession));

        let res = TestClient::delete("http://example.com/checkout/voucher")
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
