//! Delete Voucher Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use storefront_app::domain::vouchers::records::VoucherUuid;

use crate::{extensions::*, state::State, vouchers::into_status_error};

/// Delete Voucher Handler
///
/// Removes the voucher together with its claims.
#[endpoint(
    tags("admin"),
    summary = "Delete Voucher",
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Voucher deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Voucher not found"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin access required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    voucher: PathParam<Uuid>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.admin_or_403()?;

    state
        .app
        .vouchers
        .delete_voucher(VoucherUuid::from_uuid(voucher.into_inner()))
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::NO_CONTENT);

    Ok(())
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, admin_service, customer_service};

    use super::*;

    fn route() -> Router {
        Router::with_path("admin/vouchers/{voucher}").delete(handler)
    }

    #[tokio::test]
    async fn test_delete_voucher_returns_204() -> TestResult {
        let uuid = VoucherUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .vouchers
            .expect_delete_voucher()
            .once()
            .withf(move |voucher| *voucher == uuid)
            .return_once(|_| Ok(()));

        let res = TestClient::delete(format!("http://example.com/admin/vouchers/{uuid}"))
            .send(&admin_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_cannot_delete_voucher() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.vouchers.expect_delete_voucher().never();

        let res = TestClient::delete(format!(
            "http://example.com/admin/vouchers/{}",
            Uuid::now_v7()
        ))
        .send(&customer_service(mocks, route()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
