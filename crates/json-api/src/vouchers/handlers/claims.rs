//! List Voucher Claims Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    state::State,
    vouchers::{into_status_error, responses::VoucherClaimResponse},
};

/// List Voucher Claims Handler
#[endpoint(
    tags("vouchers"),
    summary = "List Voucher Claims",
    responses(
        (status_code = StatusCode::OK, description = "The caller's claims"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<VoucherClaimResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let claims = state
        .app
        .vouchers
        .list_claims(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(claims.into_iter().map(VoucherClaimResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, TEST_USER, customer_service, make_claim};

    use super::*;

    #[tokio::test]
    async fn test_list_claims_returns_unused_claim() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .vouchers
            .expect_list_claims()
            .once()
            .withf(|user| *user == TEST_USER)
            .return_once(|_| Ok(vec![make_claim("SAVE10")]));

        let mut res = TestClient::get("http://example.com/vouchers/claims")
            .send(&customer_service(
                mocks,
                Router::with_path("vouchers/claims").get(handler),
            ))
            .await;

        let body: Vec<VoucherClaimResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body[0].status, "claimed");
        assert_eq!(body[0].used_at, None);

        Ok(())
    }
}
