//! Update Voucher Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use storefront_app::domain::vouchers::records::VoucherUuid;

use crate::{
    extensions::*,
    state::State,
    vouchers::{into_status_error, requests::VoucherRequest, responses::VoucherResponse},
};

/// Update Voucher Handler
///
/// Replaces the voucher's terms. Existing claims keep pointing at the voucher.
#[endpoint(
    tags("admin"),
    summary = "Update Voucher",
    responses(
        (status_code = StatusCode::OK, description = "Voucher updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::NOT_FOUND, description = "Voucher not found"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin access required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    voucher: PathParam<Uuid>,
    json: JsonBody<VoucherRequest>,
    depot: &mut Depot,
) -> Result<Json<VoucherResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.admin_or_403()?;

    let draft = json.into_inner().into_draft()?;

    let voucher = state
        .app
        .vouchers
        .update_voucher(VoucherUuid::from_uuid(voucher.into_inner()), draft)
        .await
        .map_err(into_status_error)?;

    Ok(Json(voucher.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use serde_json::json;
    use testresult::TestResult;

    use storefront_app::domain::vouchers::VouchersServiceError;

    use crate::test_helpers::{Mocks, admin_service};

    use super::*;

    #[tokio::test]
    async fn test_update_unknown_voucher_returns_404() -> TestResult {
        let uuid = VoucherUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .vouchers
            .expect_update_voucher()
            .once()
            .withf(move |voucher, draft| *voucher == uuid && draft.discount_value == 1_500)
            .return_once(|_, _| Err(VouchersServiceError::NotFound));

        let res = TestClient::put(format!("http://example.com/admin/vouchers/{uuid}"))
            .json(&json!({
                "code": "SAVE15",
                "discount_kind": "percent",
                "discount_value": "15",
                "starts_at": "2026-01-01T00:00:00Z",
                "ends_at": "2026-12-31T23:59:59Z",
            }))
            .send(&admin_service(
                mocks,
                Router::with_path("admin/vouchers/{voucher}").put(handler),
            ))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
