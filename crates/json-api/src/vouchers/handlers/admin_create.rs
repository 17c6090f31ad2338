//! Create Voucher Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};

use storefront_app::domain::vouchers::records::VoucherUuid;

use crate::{
    extensions::*,
    state::State,
    vouchers::{into_status_error, requests::VoucherRequest, responses::VoucherResponse},
};

/// Create Voucher Handler
#[endpoint(
    tags("admin"),
    summary = "Create Voucher",
    responses(
        (status_code = StatusCode::CREATED, description = "Voucher created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::CONFLICT, description = "Voucher code already exists"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin access required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<VoucherRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<VoucherResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.admin_or_403()?;

    let draft = json.into_inner().into_draft()?;

    let voucher = state
        .app
        .vouchers
        .create_voucher(VoucherUuid::new(), draft)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/admin/vouchers/{}", voucher.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(voucher.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use storefront::vouchers::DiscountKind;
    use storefront_app::domain::vouchers::VouchersServiceError;

    use crate::test_helpers::{Mocks, admin_service, make_voucher};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        admin_service(mocks, Router::with_path("admin/vouchers").post(handler))
    }

    fn body(code: &str) -> Value {
        json!({
            "code": code,
            "discount_kind": "amount",
            "discount_value": "10.00",
            "min_spend": "30.00",
            "starts_at": "2026-01-01T00:00:00Z",
            "ends_at": "2026-12-31T23:59:59Z",
        })
    }

    #[tokio::test]
    async fn test_create_voucher_returns_201() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .vouchers
            .expect_create_voucher()
            .once()
            .withf(|_, draft| {
                draft.discount_kind == DiscountKind::Amount
                    && draft.discount_value == 1_000
                    && draft.min_spend == 3_000
                    && draft.is_active
            })
            .return_once(|uuid, draft| {
                let mut voucher = make_voucher(&draft.code.to_uppercase());
                voucher.uuid = uuid;

                Ok(voucher)
            });

        let mut res = TestClient::post("http://example.com/admin/vouchers")
            .json(&body("save10"))
            .send(&make_service(mocks))
            .await;

        let created: VoucherResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(
            location,
            Some(format!("/admin/vouchers/{}", created.uuid).as_str())
        );
        assert_eq!(created.code, "SAVE10");

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_code_returns_409() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .vouchers
            .expect_create_voucher()
            .once()
            .return_once(|_, _| Err(VouchersServiceError::AlreadyExists));

        let res = TestClient::post("http://example.com/admin/vouchers")
            .json(&body("SAVE10"))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_inconsistent_draft_returns_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .vouchers
            .expect_create_voucher()
            .once()
            .return_once(|_, _| {
                Err(VouchersServiceError::InvalidVoucher(
                    "voucher must start before it ends",
                ))
            });

        let res = TestClient::post("http://example.com/admin/vouchers")
            .json(&body("BACKWARDS"))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_discount_kind_returns_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.vouchers.expect_create_voucher().never();

        let mut request = body("SAVE10");
        request["discount_kind"] = json!("bogo");

        let res = TestClient::post("http://example.com/admin/vouchers")
            .json(&request)
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
