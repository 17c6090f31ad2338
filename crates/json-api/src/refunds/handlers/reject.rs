//! Reject Refund Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::refunds::records::RefundRequestUuid;

use crate::{
    extensions::*,
    refunds::{into_status_error, responses::RefundRequestResponse},
    state::State,
};

/// Reject Refund Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct RejectRefundRequest {
    #[serde(default)]
    pub admin_notes: Option<String>,
}

/// Reject Refund Handler
///
/// No money moves. The customer may open a new request for the purchase afterwards.
#[endpoint(
    tags("admin"),
    summary = "Reject Refund",
    responses(
        (status_code = StatusCode::OK, description = "Refund rejected"),
        (status_code = StatusCode::NOT_FOUND, description = "Refund request not found"),
        (status_code = StatusCode::CONFLICT, description = "Refund request already decided"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin access required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    request: PathParam<Uuid>,
    json: JsonBody<RejectRefundRequest>,
    depot: &mut Depot,
) -> Result<Json<RefundRequestResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.admin_or_403()?;

    let rejected = state
        .app
        .refunds
        .reject(
            RefundRequestUuid::from_uuid(request.into_inner()),
            json.into_inner().admin_notes,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(rejected.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use storefront::refunds::RefundStatus;
    use storefront_app::domain::{
        purchases::records::PurchaseUuid, refunds::RefundsServiceError,
    };

    use crate::test_helpers::{Mocks, admin_service, make_refund};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        admin_service(
            mocks,
            Router::with_path("admin/refund-requests/{request}/reject").post(handler),
        )
    }

    #[tokio::test]
    async fn test_reject_refund() -> TestResult {
        let uuid = RefundRequestUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .refunds
            .expect_reject()
            .once()
            .withf(move |request, notes| {
                *request == uuid && notes.as_deref() == Some("outside return window")
            })
            .return_once(|_, _| Ok(make_refund(PurchaseUuid::new(), RefundStatus::Rejected)));

        let mut res = TestClient::post(format!(
            "http://example.com/admin/refund-requests/{uuid}/reject"
        ))
        .json(&json!({ "admin_notes": "outside return window" }))
        .send(&make_service(mocks))
        .await;

        let body: RefundRequestResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.status, "rejected");
        assert_eq!(body.refund_amount, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_request_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .refunds
            .expect_reject()
            .once()
            .return_once(|_, _| Err(RefundsServiceError::NotFound));

        let res = TestClient::post(format!(
            "http://example.com/admin/refund-requests/{}/reject",
            Uuid::now_v7()
        ))
        .json(&json!({}))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
