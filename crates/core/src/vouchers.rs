//! Vouchers
//!
//! Voucher terms and the discount they realise against an order total.

use std::{fmt, str::FromStr};

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::{AmountError, min_amount, non_negative, percent_of, zero};

/// How a voucher's discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// A flat amount off, stored in minor units.
    Amount,

    /// A percentage off, stored in basis points.
    Percent,
}

impl DiscountKind {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::Percent => "percent",
        }
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountKind {
    type Err = VoucherError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "amount" => Ok(Self::Amount),
            "percent" => Ok(Self::Percent),
            other => Err(VoucherError::UnknownDiscountKind(other.to_string())),
        }
    }
}

/// The discount a voucher grants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoucherDiscount<'a> {
    /// Flat amount off the order.
    Amount(Money<'a, Currency>),

    /// Percentage off the order.
    Percent(Percentage),
}

impl<'a> VoucherDiscount<'a> {
    /// Build a discount from its stored kind and value.
    ///
    /// Amount values are minor units; percent values are basis points (`1000` is 10%).
    pub fn from_stored(kind: DiscountKind, value: i64, currency: &'a Currency) -> Self {
        match kind {
            DiscountKind::Amount => Self::Amount(Money::from_minor(value, currency)),
            DiscountKind::Percent => Self::Percent(Percentage::from(Decimal::new(value, 4))),
        }
    }

    /// Stored kind of this discount.
    pub fn kind(&self) -> DiscountKind {
        match self {
            Self::Amount(_) => DiscountKind::Amount,
            Self::Percent(_) => DiscountKind::Percent,
        }
    }
}

/// Terms of a voucher.
#[derive(Debug, Clone, PartialEq)]
pub struct VoucherTerms<'a> {
    /// Unique voucher code
    pub code: String,

    /// Discount granted
    pub discount: VoucherDiscount<'a>,

    /// Minimum order amount for the voucher to apply
    pub min_spend: Money<'a, Currency>,

    /// Start of the active window
    pub starts_at: Timestamp,

    /// End of the active window
    pub ends_at: Timestamp,

    /// Whether the voucher is switched on
    pub is_active: bool,
}

/// Reasons a voucher yields no usable discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VoucherRejection {
    /// No voucher was supplied.
    #[error("No voucher")]
    NoVoucher,

    /// The voucher is switched off.
    #[error("Inactive voucher")]
    Inactive,

    /// The active window has not opened yet.
    #[error("Voucher not started")]
    NotStarted,

    /// The active window has closed.
    #[error("Voucher expired")]
    Expired,

    /// The order is below the voucher's minimum spend.
    #[error("Minimum spend not met")]
    MinimumSpendNotMet,

    /// The discount would cover the entire order.
    #[error("Voucher discount cannot cover the entire order")]
    CoversWholeOrder,

    /// The claim was consumed by another purchase.
    #[error("Voucher already used")]
    AlreadyUsed,
}

/// Errors raised while evaluating vouchers.
#[derive(Debug, Error, PartialEq)]
pub enum VoucherError {
    /// The voucher was rejected for the order.
    #[error(transparent)]
    Rejected(#[from] VoucherRejection),

    /// A stored discount kind was not recognised.
    #[error("unknown discount kind {0:?}")]
    UnknownDiscountKind(String),

    /// Wrapped amount arithmetic error.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Outcome of evaluating a voucher against an amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountOutcome<'a> {
    /// Discount realised, between zero and the evaluated amount
    pub discount: Money<'a, Currency>,

    /// Why no discount was realised, if it was not
    pub rejection: Option<VoucherRejection>,
}

impl<'a> DiscountOutcome<'a> {
    fn rejected(rejection: VoucherRejection, currency: &'a Currency) -> Self {
        Self {
            discount: zero(currency),
            rejection: Some(rejection),
        }
    }
}

/// Evaluate a voucher against an order amount at a point in time.
///
/// Rules are checked in order and the first failing rule is reported with a zero discount. A
/// successful evaluation always yields a discount between zero and `amount`.
///
/// # Errors
///
/// Returns an [`AmountError`] if a percentage discount overflows or currencies differ.
pub fn compute_discount<'a>(
    voucher: Option<&VoucherTerms<'a>>,
    amount: Money<'a, Currency>,
    now: Timestamp,
) -> Result<DiscountOutcome<'a>, AmountError> {
    let currency = amount.currency();

    let Some(voucher) = voucher else {
        return Ok(DiscountOutcome::rejected(VoucherRejection::NoVoucher, currency));
    };

    let rejection = if !voucher.is_active {
        Some(VoucherRejection::Inactive)
    } else if now < voucher.starts_at {
        Some(VoucherRejection::NotStarted)
    } else if now > voucher.ends_at {
        Some(VoucherRejection::Expired)
    } else if voucher.min_spend.to_minor_units() > amount.to_minor_units() {
        Some(VoucherRejection::MinimumSpendNotMet)
    } else {
        None
    };

    if let Some(rejection) = rejection {
        return Ok(DiscountOutcome::rejected(rejection, currency));
    }

    let raw = match &voucher.discount {
        VoucherDiscount::Amount(value) => *value,
        VoucherDiscount::Percent(percent) => percent_of(&amount, percent)?,
    };

    let discount = min_amount(non_negative(raw), non_negative(amount))?;

    Ok(DiscountOutcome {
        discount,
        rejection: None,
    })
}

/// Evaluate a voucher for use at checkout, rejecting any discount that covers the whole order.
///
/// # Errors
///
/// Returns [`VoucherError::Rejected`] when the voucher yields no discount or a discount of at
/// least `amount`.
pub fn checkout_discount<'a>(
    voucher: &VoucherTerms<'a>,
    amount: Money<'a, Currency>,
    now: Timestamp,
) -> Result<Money<'a, Currency>, VoucherError> {
    let outcome = compute_discount(Some(voucher), amount, now)?;

    if let Some(rejection) = outcome.rejection {
        return Err(rejection.into());
    }

    if outcome.discount.to_minor_units() >= amount.to_minor_units() {
        return Err(VoucherRejection::CoversWholeOrder.into());
    }

    Ok(outcome.discount)
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::money::sgd;

    use super::*;

    fn voucher(discount: VoucherDiscount<'static>) -> VoucherTerms<'static> {
        let now = Timestamp::now();

        VoucherTerms {
            code: "SAVE10".to_string(),
            discount,
            min_spend: sgd(0),
            starts_at: now - 24.hours(),
            ends_at: now + 24.hours(),
            is_active: true,
        }
    }

    fn ten_percent() -> VoucherDiscount<'static> {
        VoucherDiscount::from_stored(DiscountKind::Percent, 1_000, iso::SGD)
    }

    #[test]
    fn missing_voucher_is_reported() -> TestResult {
        let outcome = compute_discount(None, sgd(10_700), Timestamp::now())?;

        assert_eq!(outcome.discount, sgd(0));
        assert_eq!(outcome.rejection, Some(VoucherRejection::NoVoucher));

        Ok(())
    }

    #[test]
    fn percent_voucher_discounts_amount() -> TestResult {
        let outcome = compute_discount(Some(&voucher(ten_percent())), sgd(10_700), Timestamp::now())?;

        assert_eq!(outcome.discount, sgd(1_070));
        assert_eq!(outcome.rejection, None);

        Ok(())
    }

    #[test]
    fn flat_voucher_clamps_to_amount() -> TestResult {
        let terms = voucher(VoucherDiscount::Amount(sgd(3_000)));
        let outcome = compute_discount(Some(&terms), sgd(2_640), Timestamp::now())?;

        assert_eq!(outcome.discount, sgd(2_640));

        Ok(())
    }

    #[test]
    fn negative_flat_voucher_clamps_to_zero() -> TestResult {
        let terms = voucher(VoucherDiscount::Amount(sgd(-500)));
        let outcome = compute_discount(Some(&terms), sgd(2_640), Timestamp::now())?;

        assert_eq!(outcome.discount, sgd(0));

        Ok(())
    }

    #[test]
    fn rules_are_checked_in_order() -> TestResult {
        let now = Timestamp::now();

        // Inactive wins over an expired window.
        let mut terms = voucher(ten_percent());
        terms.is_active = false;
        terms.ends_at = now - 1.hour();

        let outcome = compute_discount(Some(&terms), sgd(10_000), now)?;

        assert_eq!(outcome.rejection, Some(VoucherRejection::Inactive));

        // Not started wins over minimum spend.
        let mut terms = voucher(ten_percent());
        terms.starts_at = now + 1.hour();
        terms.min_spend = sgd(1_000_000);

        let outcome = compute_discount(Some(&terms), sgd(10_000), now)?;

        assert_eq!(outcome.rejection, Some(VoucherRejection::NotStarted));

        Ok(())
    }

    #[test]
    fn expired_voucher_is_rejected() -> TestResult {
        let now = Timestamp::now();
        let mut terms = voucher(ten_percent());
        terms.ends_at = now - 1.second();

        let outcome = compute_discount(Some(&terms), sgd(10_000), now)?;

        assert_eq!(outcome.discount, sgd(0));
        assert_eq!(outcome.rejection, Some(VoucherRejection::Expired));

        Ok(())
    }

    #[test]
    fn minimum_spend_compares_against_amount() -> TestResult {
        let mut terms = voucher(ten_percent());
        terms.min_spend = sgd(10_000);

        let below = compute_discount(Some(&terms), sgd(9_999), Timestamp::now())?;
        let equal = compute_discount(Some(&terms), sgd(10_000), Timestamp::now())?;

        assert_eq!(below.rejection, Some(VoucherRejection::MinimumSpendNotMet));
        assert_eq!(equal.rejection, None);

        Ok(())
    }

    #[test]
    fn discount_always_within_bounds() -> TestResult {
        let discounts = [
            VoucherDiscount::Amount(sgd(0)),
            VoucherDiscount::Amount(sgd(1)),
            VoucherDiscount::Amount(sgd(50_000)),
            VoucherDiscount::from_stored(DiscountKind::Percent, 10_000, iso::SGD),
            VoucherDiscount::from_stored(DiscountKind::Percent, 25_000, iso::SGD),
            ten_percent(),
        ];

        for discount in discounts {
            for amount in [0, 1, 99, 2_640, 10_700] {
                let outcome = compute_discount(Some(&voucher(discount)), sgd(amount), Timestamp::now())?;
                let minor = outcome.discount.to_minor_units();

                assert!(
                    (0..=amount).contains(&minor),
                    "discount {minor} out of bounds for amount {amount}"
                );
            }
        }

        Ok(())
    }

    #[test]
    fn checkout_rejects_full_coverage() {
        let terms = voucher(VoucherDiscount::Amount(sgd(3_000)));
        let result = checkout_discount(&terms, sgd(2_640), Timestamp::now());

        assert_eq!(
            result,
            Err(VoucherError::Rejected(VoucherRejection::CoversWholeOrder))
        );
    }

    #[test]
    fn checkout_surfaces_rule_rejection() {
        let mut terms = voucher(ten_percent());
        terms.is_active = false;

        let result = checkout_discount(&terms, sgd(2_640), Timestamp::now());

        assert_eq!(result, Err(VoucherError::Rejected(VoucherRejection::Inactive)));
    }

    #[test]
    fn discount_kind_round_trips_storage_form() -> TestResult {
        assert_eq!("amount".parse::<DiscountKind>()?, DiscountKind::Amount);
        assert_eq!(DiscountKind::Percent.as_str(), "percent");
        assert!("bogus".parse::<DiscountKind>().is_err());

        Ok(())
    }
}
