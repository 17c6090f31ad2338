//! List Vouchers Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    state::State,
    vouchers::{into_status_error, responses::VoucherResponse},
};

/// List Vouchers Handler
///
/// Every voucher regardless of window or active flag.
#[endpoint(
    tags("admin"),
    summary = "List Vouchers",
    responses(
        (status_code = StatusCode::OK, description = "Vouchers"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin access required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<VoucherResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.admin_or_403()?;

    let vouchers = state
        .app
        .vouchers
        .list_vouchers()
        .await
        .map_err(into_status_error)?;

    Ok(Json(vouchers.into_iter().map(VoucherResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, admin_service, customer_service, make_voucher};

    use super::*;

    fn route() -> Router {
        Router::with_path("admin/vouchers").get(handler)
    }

    #[tokio::test]
    async fn test_admin_lists_vouchers() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .vouchers
            .expect_list_vouchers()
            .once()
            .return_once(|| Ok(vec![make_voucher("SAVE10")]));

        let mut res = TestClient::get("http://example.com/admin/vouchers")
            .send(&admin_service(mocks, route()))
            .await;

        let body: Vec<VoucherResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body[0].min_spend, "30.00");

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_returns_403() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.vouchers.expect_list_vouchers().never();

        let res = TestClient::get("http://example.com/admin/vouchers")
            .send(&customer_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
