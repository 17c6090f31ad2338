//! Voucher Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use storefront::{
    money::{currency, sgd},
    vouchers::{DiscountKind, VoucherDiscount, VoucherTerms},
};
use uuid::Uuid;

use crate::{
    domain::{users::records::UserUuid, wallets::records::UnknownVariant},
    uuids::TypedUuid,
};

/// Voucher UUID
pub type VoucherUuid = TypedUuid<VoucherRecord>;

/// Voucher Record
///
/// `discount_value` is minor units for amount vouchers and basis points for percent vouchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherRecord {
    pub uuid: VoucherUuid,
    pub code: String,
    pub description: String,
    pub discount_kind: DiscountKind,
    pub discount_value: i64,
    pub min_spend: i64,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl VoucherRecord {
    /// Terms evaluated by the discount engine.
    #[must_use]
    pub fn terms(&self) -> VoucherTerms<'static> {
        VoucherTerms {
            code: self.code.clone(),
            discount: VoucherDiscount::from_stored(
                self.discount_kind,
                self.discount_value,
                currency(),
            ),
            min_spend: sgd(self.min_spend),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            is_active: self.is_active,
        }
    }

    /// Active and inside its validity window at `now`.
    #[must_use]
    pub fn is_claimable_at(&self, now: Timestamp) -> bool {
        self.is_active && self.starts_at <= now && now <= self.ends_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimStatus {
    Claimed,
    Used,
}

impl ClaimStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Claimed => "claimed",
            Self::Used => "used",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "claimed" => Ok(Self::Claimed),
            "used" => Ok(Self::Used),
            other => Err(UnknownVariant::new("claim status", other)),
        }
    }
}

/// Voucher Claim UUID
pub type VoucherClaimUuid = TypedUuid<VoucherClaimRecord>;

/// A user's claim on a voucher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherClaimRecord {
    pub uuid: VoucherClaimUuid,
    pub user: UserUuid,
    pub voucher: VoucherRecord,
    pub status: ClaimStatus,
    pub purchase: Option<Uuid>,
    pub claimed_at: Timestamp,
    pub used_at: Option<Timestamp>,
}

/// A voucher offered to a user, with whether they already hold it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimableVoucherRecord {
    pub voucher: VoucherRecord,
    pub claimed: bool,
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use storefront::vouchers::compute_discount;
    use testresult::TestResult;

    use super::*;

    fn record(kind: DiscountKind, value: i64) -> VoucherRecord {
        let now = Timestamp::now();

        VoucherRecord {
            uuid: VoucherUuid::new(),
            code: "SAVE10".to_string(),
            description: String::new(),
            discount_kind: kind,
            discount_value: value,
            min_spend: 3_000,
            starts_at: now - 1.day(),
            ends_at: now + 1.day(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn percent_terms_use_basis_points() -> TestResult {
        let terms = record(DiscountKind::Percent, 1_000).terms();

        assert_eq!(terms.discount.kind(), DiscountKind::Percent);
        assert_eq!(terms.min_spend, sgd(3_000));

        let outcome = compute_discount(Some(&terms), sgd(10_700), Timestamp::now())?;

        assert_eq!(outcome.discount, sgd(1_070));

        Ok(())
    }

    #[test]
    fn inactive_or_expired_vouchers_are_not_claimable() {
        let now = Timestamp::now();
        let mut voucher = record(DiscountKind::Amount, 500);

        assert!(voucher.is_claimable_at(now));

        voucher.is_active = false;
        assert!(!voucher.is_claimable_at(now));

        voucher.is_active = true;
        assert!(!voucher.is_claimable_at(now + 2.days()));
    }
}
