//! Refund Records

use jiff::Timestamp;
use storefront::refunds::RefundStatus;

use crate::{
    domain::{purchases::records::PurchaseUuid, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Refund Request UUID
pub type RefundRequestUuid = TypedUuid<RefundRequestRecord>;

/// A customer's request to reverse part of a purchase.
///
/// `refund_amount` (minor units) is only set once approved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRequestRecord {
    pub uuid: RefundRequestUuid,
    pub purchase: PurchaseUuid,
    pub user: UserUuid,
    pub reason: String,
    pub status: RefundStatus,
    pub admin_notes: Option<String>,
    pub refund_amount: Option<i64>,
    pub requested_at: Timestamp,
    pub processed_at: Option<Timestamp>,
}

impl RefundRequestRecord {
    /// Wallet transaction reference for the store credit issued on approval.
    #[must_use]
    pub fn credit_reference(&self) -> String {
        format!("refund:{}", self.uuid)
    }
}
