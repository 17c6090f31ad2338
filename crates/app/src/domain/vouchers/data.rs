//! Voucher Data

use jiff::Timestamp;
use serde::Deserialize;
use storefront::vouchers::DiscountKind;

use crate::domain::vouchers::errors::VouchersServiceError;

/// Highest percent discount, in basis points.
const MAX_PERCENT_BASIS_POINTS: i64 = 10_000;

/// Voucher fields supplied when creating or replacing a voucher.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VoucherDraft {
    pub code: String,

    #[serde(default)]
    pub description: String,

    pub discount_kind: DiscountKind,

    /// Minor units for amount vouchers, basis points for percent vouchers
    pub discount_value: i64,

    #[serde(default)]
    pub min_spend: i64,

    pub starts_at: Timestamp,
    pub ends_at: Timestamp,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl VoucherDraft {
    /// Check the draft is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`VouchersServiceError::InvalidVoucher`] describing the first problem found.
    pub fn validate(&self) -> Result<(), VouchersServiceError> {
        if self.code.trim().is_empty() {
            return Err(VouchersServiceError::InvalidVoucher("code is required"));
        }

        if self.discount_value <= 0 {
            return Err(VouchersServiceError::InvalidVoucher(
                "discount value must be positive",
            ));
        }

        if self.discount_kind == DiscountKind::Percent
            && self.discount_value > MAX_PERCENT_BASIS_POINTS
        {
            return Err(VouchersServiceError::InvalidVoucher(
                "percent discount cannot exceed 100%",
            ));
        }

        if self.min_spend < 0 {
            return Err(VouchersServiceError::InvalidVoucher(
                "minimum spend cannot be negative",
            ));
        }

        if self.starts_at > self.ends_at {
            return Err(VouchersServiceError::InvalidVoucher(
                "voucher must start before it ends",
            ));
        }

        Ok(())
    }

    /// Codes are matched case-insensitively and stored upper case.
    #[must_use]
    pub fn normalised_code(&self) -> String {
        self.code.trim().to_uppercase()
    }
}
