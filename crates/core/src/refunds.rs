//! Refunds
//!
//! Refund request lifecycle rules.

use std::{fmt, str::FromStr};

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Refund request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    /// Awaiting an admin decision
    Pending,

    /// Approved and credited
    Approved,

    /// Rejected by an admin
    Rejected,
}

impl RefundStatus {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns true once an admin has decided the request.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Returns true if a request in this status prevents another request for the same purchase.
    pub const fn blocks_new_request(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefundStatus {
    type Err = RefundError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(RefundError::UnknownStatus(other.to_string())),
        }
    }
}

/// Errors raised by refund rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefundError {
    /// The purchase already has an open or approved request.
    #[error("a refund request already exists for this purchase")]
    AlreadyRequested,

    /// The request has already been decided.
    #[error("refund request is already {0}")]
    AlreadyDecided(RefundStatus),

    /// Approved refund amounts must be positive.
    #[error("refund amount must be positive")]
    InvalidAmount,

    /// Refunds cannot exceed what the customer paid.
    #[error("refund of {requested} exceeds the {paid} paid")]
    ExceedsPaid {
        /// Requested refund (minor units)
        requested: i64,

        /// Amount paid across all instruments (minor units)
        paid: i64,
    },

    /// A reason is required.
    #[error("refund reason is required")]
    MissingReason,

    /// A stored status was not recognised.
    #[error("unknown refund status {0:?}")]
    UnknownStatus(String),
}

/// Check that a new request may be opened given the statuses of existing requests.
///
/// # Errors
///
/// Returns [`RefundError::AlreadyRequested`] if any existing request is pending or approved.
pub fn ensure_can_request(
    existing: impl IntoIterator<Item = RefundStatus>,
    reason: &str,
) -> Result<(), RefundError> {
    if reason.trim().is_empty() {
        return Err(RefundError::MissingReason);
    }

    if existing.into_iter().any(RefundStatus::blocks_new_request) {
        return Err(RefundError::AlreadyRequested);
    }

    Ok(())
}

/// Check that a request in `current` status may be decided.
///
/// # Errors
///
/// Returns [`RefundError::AlreadyDecided`] if the request is no longer pending.
pub fn ensure_pending(current: RefundStatus) -> Result<(), RefundError> {
    if current.is_terminal() {
        return Err(RefundError::AlreadyDecided(current));
    }

    Ok(())
}

/// Validate the amount an admin approves.
///
/// # Errors
///
/// Returns [`RefundError::InvalidAmount`] unless the amount is positive, or
/// [`RefundError::ExceedsPaid`] if it is more than `paid`.
pub fn ensure_approvable(
    amount: &Money<'_, Currency>,
    paid: &Money<'_, Currency>,
) -> Result<(), RefundError> {
    if amount.to_minor_units() <= 0 {
        return Err(RefundError::InvalidAmount);
    }

    if amount.to_minor_units() > paid.to_minor_units() {
        return Err(RefundError::ExceedsPaid {
            requested: amount.to_minor_units(),
            paid: paid.to_minor_units(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::money::sgd;

    use super::*;

    const NO_REQUESTS: [RefundStatus; 0] = [];

    #[test]
    fn rejected_requests_do_not_block() {
        assert_eq!(ensure_can_request([RefundStatus::Rejected], "broken"), Ok(()));
        assert_eq!(ensure_can_request(NO_REQUESTS, "broken"), Ok(()));
    }

    #[test]
    fn open_or_approved_requests_block() {
        assert_eq!(
            ensure_can_request([RefundStatus::Rejected, RefundStatus::Pending], "broken"),
            Err(RefundError::AlreadyRequested)
        );
        assert_eq!(
            ensure_can_request([RefundStatus::Approved], "broken"),
            Err(RefundError::AlreadyRequested)
        );
    }

    #[test]
    fn blank_reason_is_rejected() {
        assert_eq!(
            ensure_can_request(NO_REQUESTS, "   "),
            Err(RefundError::MissingReason)
        );
    }

    #[test]
    fn decided_requests_cannot_transition() {
        assert_eq!(ensure_pending(RefundStatus::Pending), Ok(()));
        assert_eq!(
            ensure_pending(RefundStatus::Approved),
            Err(RefundError::AlreadyDecided(RefundStatus::Approved))
        );
        assert_eq!(
            ensure_pending(RefundStatus::Rejected),
            Err(RefundError::AlreadyDecided(RefundStatus::Rejected))
        );
    }

    #[test]
    fn approval_requires_positive_amount() {
        let paid = sgd(4_630);

        assert_eq!(ensure_approvable(&sgd(1), &paid), Ok(()));
        assert_eq!(
            ensure_approvable(&sgd(0), &paid),
            Err(RefundError::InvalidAmount)
        );
        assert_eq!(
            ensure_approvable(&sgd(-100), &paid),
            Err(RefundError::InvalidAmount)
        );
    }

    #[test]
    fn approval_is_capped_at_amount_paid() {
        let paid = sgd(4_630);

        assert_eq!(ensure_approvable(&sgd(4_630), &paid), Ok(()));
        assert_eq!(
            ensure_approvable(&sgd(4_631), &paid),
            Err(RefundError::ExceedsPaid {
                requested: 4_631,
                paid: 4_630
            })
        );
    }

    #[test]
    fn status_round_trips_storage_form() -> TestResult {
        for status in [
            RefundStatus::Pending,
            RefundStatus::Approved,
            RefundStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<RefundStatus>()?, status);
        }

        Ok(())
    }
}
