//! Voucher Requests

use jiff::Timestamp;
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};

use storefront::vouchers::DiscountKind;
use storefront_app::domain::vouchers::data::VoucherDraft;

use crate::{amounts, extensions::*};

/// Voucher Request
///
/// Used both to create a voucher and to replace its terms.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VoucherRequest {
    /// Matched case-insensitively at checkout
    pub code: String,

    #[serde(default)]
    pub description: String,

    /// `amount` or `percent`
    pub discount_kind: String,

    /// Decimal amount off, or percentage off such as `"12.5"`
    pub discount_value: String,

    /// Minimum order total before discount, as a decimal amount
    #[serde(default)]
    pub min_spend: Option<String>,

    /// RFC 3339 timestamp
    pub starts_at: String,

    /// RFC 3339 timestamp
    pub ends_at: String,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

fn parse_timestamp(field: &str, value: &str) -> Result<Timestamp, StatusError> {
    value
        .parse::<Timestamp>()
        .map_err(|error| StatusError::bad_request().brief(format!("{field}: {error}")))
}

impl VoucherRequest {
    /// Convert to a draft. Percentages and amounts share two decimal places, so a percentage
    /// parsed as an amount is already in basis points.
    pub(crate) fn into_draft(self) -> Result<VoucherDraft, StatusError> {
        let discount_kind = self.discount_kind.parse::<DiscountKind>().or_400()?;

        let discount_value =
            amounts::parse("discount_value", &self.discount_value)?.to_minor_units();

        let min_spend = match self.min_spend.as_deref() {
            Some(value) => amounts::parse("min_spend", value)?.to_minor_units(),
            None => 0,
        };

        Ok(VoucherDraft {
            code: self.code,
            description: self.description,
            discount_kind,
            discount_value,
            min_spend,
            starts_at: parse_timestamp("starts_at", &self.starts_at)?,
            ends_at: parse_timestamp("ends_at", &self.ends_at)?,
            is_active: self.is_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn request() -> VoucherRequest {
        VoucherRequest {
            code: "save15".to_string(),
            description: String::new(),
            discount_kind: "percent".to_string(),
            discount_value: "12.5".to_string(),
            min_spend: Some("30.00".to_string()),
            starts_at: "2026-01-01T00:00:00Z".to_string(),
            ends_at: "2026-12-31T23:59:59Z".to_string(),
            is_active: true,
        }
    }

    #[test]
    fn percentages_become_basis_points() -> TestResult {
        let draft = request().into_draft()?;

        assert_eq!(draft.discount_kind, DiscountKind::Percent);
        assert_eq!(draft.discount_value, 1_250);
        assert_eq!(draft.min_spend, 3_000);

        Ok(())
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let mut voucher = request();
        voucher.discount_kind = "bogo".to_string();

        assert!(voucher.into_draft().is_err());
    }

    #[test]
    fn malformed_window_is_rejected() {
        let mut voucher = request();
        voucher.ends_at = "next tuesday".to_string();

        assert!(voucher.into_draft().is_err());
    }
}
