//! Abandon Checkout Handler

use std::sync::Arc;

use salvo::prelude::*;
use tracing::info;

use crate::{extensions::*, state::State};

/// Abandon Checkout Handler
#[endpoint(
    tags("checkout"),
    summary = "Abandon Checkout",
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Checkout abandoned"),
        (status_code = StatusCode::NOT_FOUND, description = "No checkout in progress"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot, res: &mut Response) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    if !state.app.checkout.abandon(user) {
        return Err(StatusError::not_found().brief("No checkout in progress"));
    }

    info!(user_uuid = %user, "checkout abandoned");

    res.status_code(StatusCode::NO_CONTENT);

    Ok(())
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, TEST_USER, customer_service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        customer_service(mocks, Router::with_path("checkout").delete(handler))
    }

    #[tokio::test]
    async fn test_abandon_returns_204() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_abandon()
            .once()
            .withf(|user| *user == TEST_USER)
            .return_const(true);

        let res = TestClient::delete("http://example.com/checkout")
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        Ok(())
    }

    #[tokio::test]
    async fn test_abandon_without_checkout_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.checkout.expect_abandon().once().return_const(false);

        let res = TestClient::delete("http://example.com/checkout")
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
