//! List Purchases Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    purchases::{into_status_error, responses::PurchaseResponse},
    state::State,
};

/// List Purchases Handler
///
/// Returns the caller's purchases, newest first.
#[endpoint(
    tags("purchases"),
    summary = "List Purchases",
    responses(
        (status_code = StatusCode::OK, description = "Purchases"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<PurchaseResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let purchases = state
        .app
        .purchases
        .list_purchases(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(purchases.into_iter().map(PurchaseResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::domain::purchases::records::PurchaseUuid;

    use crate::test_helpers::{Mocks, TEST_USER, customer_service, make_purchase};

    use super::*;

    #[tokio::test]
    async fn test_list_purchases_returns_callers_history() -> TestResult {
        let uuid = PurchaseUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .purchases
            .expect_list_purchases()
            .once()
            .withf(|user| *user == TEST_USER)
            .return_once(move |_| Ok(vec![make_purchase(uuid)]));

        let mut res = TestClient::get("http://example.com/purchases")
            .send(&customer_service(
                mocks,
                Router::with_path("purchases").get(handler),
            ))
            .await;

        let body: Vec<PurchaseResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].uuid, uuid.into_uuid());
        assert_eq!(body[0].total, "58.50");
        assert_eq!(body[0].lines[0].line_total, "50.00");

        Ok(())
    }
}
