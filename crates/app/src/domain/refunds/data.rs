//! Refund Data

use rusty_money::{Money, iso::Currency};

/// An admin's approval of a pending request.
#[derive(Debug, Clone, PartialEq)]
pub struct RefundDecision {
    pub admin_notes: Option<String>,
    pub amount: Money<'static, Currency>,
}
