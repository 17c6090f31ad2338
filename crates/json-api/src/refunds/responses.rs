//! Refund Responses

use std::string::ToString;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::refunds::records::RefundRequestRecord;

use crate::amounts;

/// Refund Request Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RefundRequestResponse {
    pub uuid: Uuid,

    pub purchase_uuid: Uuid,

    pub user_uuid: Uuid,

    pub reason: String,

    /// `pending`, `approved` or `rejected`
    pub status: String,

    pub admin_notes: Option<String>,

    /// Credited to store credit once approved
    pub refund_amount: Option<String>,

    pub requested_at: String,

    pub processed_at: Option<String>,
}

impl From<RefundRequestRecord> for RefundRequestResponse {
    fn from(request: RefundRequestRecord) -> Self {
        Self {
            uuid: request.uuid.into_uuid(),
            purchase_uuid: request.purchase.into_uuid(),
            user_uuid: request.user.into_uuid(),
            reason: request.reason,
            status: request.status.as_str().to_string(),
            admin_notes: request.admin_notes,
            refund_amount: request.refund_amount.map(amounts::format),
            requested_at: request.requested_at.to_string(),
            processed_at: request.processed_at.as_ref().map(ToString::to_string),
        }
    }
}
