//! Approve Refund Handler

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

use storefront_app::domain::refunds::{data::RefundDecision, records::RefundRequestUuid};

use crate::{
    amounts,
    extensions::*,
    refunds::{into_status_error, responses::RefundRequestResponse},
    state::State,
};

/// Approve Refund Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApproveRefundRequest {
    /// Decimal amount credited to the customer's store credit
    pub amount: String,

    #[serde(default)]
    pub admin_notes: Option<String>,
}

/// Approve Refund Handler
///
/// Credits the amount to the customer's store credit. The amount may not exceed what was paid
/// for the purchase across all instruments.
#[endpoint(
    tags("admin"),
    summary = "Approve Refund",
    responses(
        (status_code = StatusCode::OK, description = "Refund approved"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid amount"),
        (status_code = StatusCode::NOT_FOUND, description = "Refund request not found"),
        (status_code = StatusCode::CONFLICT, description = "Refund request already decided"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin access required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    request: PathParam<Uuid>,
    json: JsonBody<ApproveRefundRequest>,
    depot: &mut Depot,
) -> Result<Json<RefundRequestResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.admin_or_403()?;

    let body = json.into_inner();

    let decision = RefundDecision {
        admin_notes: body.admin_notes,
        amount: amounts::parse("amount", &body.amount)?,
    };

    let approved = state
        .app
        .refunds
        .approve(RefundRequestUuid::from_uuid(request.into_inner()), decision)
        .await
        .map_err(into_status_error)?;

    Ok(Json(approved.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use storefront::{
        money::sgd,
        refunds::{RefundError, RefundStatus},
    };
    use storefront_app::domain::{
        purchases::records::PurchaseUuid, refunds::RefundsServiceError,
    };

    use crate::test_helpers::{Mocks, admin_service, customer_service, make_refund};

    use super::*;

    fn route() -> Router {
        Router::with_path("admin/refund-requests/{request}/approve").post(handler)
    }

    #[tokio::test]
    async fn test_approve_credits_requested_amount() -> TestResult {
        let uuid = RefundRequestUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .refunds
            .expect_approve()
            .once()
            .withf(move |request, decision| {
                *request == uuid
                    && decision.amount == sgd(5_850)
                    && decision.admin_notes.as_deref() == Some("damaged in transit")
            })
            .return_once(|_, _| Ok(make_refund(PurchaseUuid::new(), RefundStatus::Approved)));

        let mut res = TestClient::post(format!(
            "http://example.com/admin/refund-requests/{uuid}/approve"
        ))
        .json(&json!({ "amount": "58.50", "admin_notes": "damaged in transit" }))
        .send(&admin_service(mocks, route()))
        .await;

        let body: RefundRequestResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.status, "approved");
        assert!(body.processed_at.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_amount_above_paid_returns_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.refunds.expect_approve().once().return_once(|_, _| {
            Err(RefundsServiceError::Refund(RefundError::ExceedsPaid {
                requested: 10_000,
                paid: 5_850,
            }))
        });

        let res = TestClient::post(format!(
            "http://example.com/admin/refund-requests/{}/approve",
            Uuid::now_v7()
        ))
        .json(&json!({ "amount": "100.00" }))
        .send(&admin_service(mocks, route()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_decided_request_returns_409() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.refunds.expect_approve().once().return_once(|_, _| {
            Err(RefundsServiceError::Refund(RefundError::AlreadyDecided(
                RefundStatus::Rejected,
            )))
        });

        let res = TestClient::post(format!(
            "http://example.com/admin/refund-requests/{}/approve",
            Uuid::now_v7()
        ))
        .json(&json!({ "amount": "10.00" }))
        .send(&admin_service(mocks, route()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_cannot_approve() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.refunds.expect_approve().never();

        let res = TestClient::post(format!(
            "http://example.com/admin/refund-requests/{}/approve",
            Uuid::now_v7()
        ))
        .json(&json!({ "amount": "10.00" }))
        .send(&customer_service(mocks, route()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
