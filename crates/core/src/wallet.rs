//! Wallet
//!
//! Loyalty points, store credit and e-wallet rules.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::money::{AmountError, min_amount, non_negative};

/// Points needed for one unit of store credit.
pub const POINTS_PER_CREDIT_UNIT: i64 = 100;

/// Store credit granted per conversion unit (minor units).
pub const CREDIT_PER_CONVERSION_MINOR: i64 = 100;

/// Points earned per whole currency unit spent.
pub const POINTS_PER_CURRENCY_UNIT: i64 = 10;

/// Largest single e-wallet top-up (minor units).
pub const MAX_TOP_UP_MINOR: i64 = 1_000_000;

/// Why a points conversion was refused.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PointsRejection {
    /// Points must be converted in whole conversion units.
    #[error("points must be converted in multiples of 100")]
    NotMultipleOfConversionUnit,

    /// Zero or negative points requested.
    #[error("points to convert must be positive")]
    NotPositive,

    /// The user does not hold enough points.
    #[error("insufficient points: requested {requested}, available {available}")]
    ExceedsBalance {
        /// Points requested
        requested: i64,

        /// Points held
        available: i64,
    },
}

/// Why a top-up amount was refused.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TopUpRejection {
    /// Zero or negative amount.
    #[error("top-up amount must be positive")]
    NotPositive,

    /// Above the per-top-up ceiling.
    #[error("top-up amount exceeds the maximum of 10000.00")]
    AboveMaximum,
}

/// Errors raised by wallet rules.
#[derive(Debug, Error, PartialEq)]
pub enum WalletError {
    /// Points conversion refused.
    #[error(transparent)]
    InsufficientPoints(#[from] PointsRejection),

    /// Top-up amount refused.
    #[error(transparent)]
    InvalidTopUp(#[from] TopUpRejection),

    /// A strict spend exceeded the available balance.
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Minor units requested
        requested: i64,

        /// Minor units available
        available: i64,
    },

    /// Wrapped amount arithmetic error.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

impl From<rusty_money::MoneyError> for WalletError {
    fn from(error: rusty_money::MoneyError) -> Self {
        Self::Amount(AmountError::Money(error))
    }
}

/// Points earned for a charged amount: ten per whole currency unit, rounded down.
///
/// Negative amounts earn nothing.
pub fn points_earned(amount: &Money<'_, Currency>) -> i64 {
    let minor = amount.to_minor_units();

    if minor <= 0 {
        return 0;
    }

    // SGD has a two digit exponent; ten points per dollar is one point per ten cents.
    minor / (100 / POINTS_PER_CURRENCY_UNIT)
}

/// Store credit granted for converting `points`.
///
/// # Errors
///
/// Returns [`WalletError::InsufficientPoints`] if the request is not a positive multiple of
/// [`POINTS_PER_CREDIT_UNIT`] or exceeds `available`.
pub fn credit_for_points<'a>(
    points: i64,
    available: i64,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, WalletError> {
    if points <= 0 {
        return Err(PointsRejection::NotPositive.into());
    }

    if points % POINTS_PER_CREDIT_UNIT != 0 {
        return Err(PointsRejection::NotMultipleOfConversionUnit.into());
    }

    if points > available {
        return Err(PointsRejection::ExceedsBalance {
            requested: points,
            available,
        }
        .into());
    }

    let minor = (points / POINTS_PER_CREDIT_UNIT)
        .checked_mul(CREDIT_PER_CONVERSION_MINOR)
        .ok_or(AmountError::Overflow)?;

    Ok(Money::from_minor(minor, currency))
}

/// Points that auto-conversion would convert from `balance`, if any.
///
/// Converts the largest whole multiple of [`POINTS_PER_CREDIT_UNIT`] held; leftover points stay.
pub fn auto_conversion(balance: i64) -> Option<i64> {
    if balance < POINTS_PER_CREDIT_UNIT {
        return None;
    }

    Some(balance - balance % POINTS_PER_CREDIT_UNIT)
}

/// Result of crediting earned points to a balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointsAccrual<'a> {
    /// Points balance after earning and any conversion
    pub balance: i64,

    /// Points auto-converted to store credit, zero when none
    pub converted: i64,

    /// Store credit granted by the conversion
    pub credit: Money<'a, Currency>,
}

/// Apply `earned` points to `balance`, auto-converting whole units when enabled.
///
/// # Errors
///
/// Returns [`WalletError::Amount`] if the balance overflows.
pub fn accrue_points<'a>(
    balance: i64,
    earned: i64,
    auto_convert: bool,
    currency: &'a Currency,
) -> Result<PointsAccrual<'a>, WalletError> {
    let balance = balance
        .max(0)
        .checked_add(earned.max(0))
        .ok_or(AmountError::Overflow)?;

    let converted = if auto_convert {
        auto_conversion(balance).unwrap_or(0)
    } else {
        0
    };

    let credit = if converted > 0 {
        credit_for_points(converted, balance, currency)?
    } else {
        Money::from_minor(0, currency)
    };

    Ok(PointsAccrual {
        balance: balance - converted,
        converted,
        credit,
    })
}

/// Check a points spend against the points held.
///
/// # Errors
///
/// Returns [`WalletError::InsufficientPoints`] if `points` is not positive or exceeds `available`.
pub fn ensure_points(points: i64, available: i64) -> Result<(), WalletError> {
    if points <= 0 {
        return Err(PointsRejection::NotPositive.into());
    }

    if points > available {
        return Err(PointsRejection::ExceedsBalance {
            requested: points,
            available,
        }
        .into());
    }

    Ok(())
}

/// Validate an e-wallet top-up amount.
///
/// # Errors
///
/// Returns [`WalletError::InvalidTopUp`] if the amount is not positive or above
/// [`MAX_TOP_UP_MINOR`].
pub fn validate_top_up(amount: &Money<'_, Currency>) -> Result<(), WalletError> {
    let minor = amount.to_minor_units();

    if minor <= 0 {
        return Err(TopUpRejection::NotPositive.into());
    }

    if minor > MAX_TOP_UP_MINOR {
        return Err(TopUpRejection::AboveMaximum.into());
    }

    Ok(())
}

/// Amount actually taken when deducting `requested` from `balance` during settlement.
///
/// Settlement deductions are clamped to the available balance; allocation has already bounded
/// them, so a shortfall here only arises from a concurrent spend.
///
/// # Errors
///
/// Returns [`WalletError::Amount`] if currencies differ.
pub fn clamped_deduction<'a>(
    requested: Money<'a, Currency>,
    balance: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, WalletError> {
    Ok(min_amount(non_negative(requested), non_negative(balance))?)
}

/// Check a strict spend against the available balance.
///
/// # Errors
///
/// Returns [`WalletError::InsufficientFunds`] if `requested` exceeds `balance`.
pub fn ensure_sufficient(
    requested: &Money<'_, Currency>,
    balance: &Money<'_, Currency>,
) -> Result<(), WalletError> {
    if requested.to_minor_units() > balance.to_minor_units() {
        return Err(WalletError::InsufficientFunds {
            requested: requested.to_minor_units(),
            available: balance.to_minor_units(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::money::sgd;

    use super::*;

    #[test]
    fn points_are_ten_per_dollar_rounded_down() {
        assert_eq!(points_earned(&sgd(4_630)), 463);
        assert_eq!(points_earned(&sgd(2_759)), 275);
        assert_eq!(points_earned(&sgd(9)), 0);
        assert_eq!(points_earned(&sgd(-500)), 0);
    }

    #[test]
    fn converting_points_grants_one_dollar_per_hundred() -> TestResult {
        assert_eq!(credit_for_points(300, 463, iso::SGD)?, sgd(300));

        Ok(())
    }

    #[test]
    fn converting_points_rejects_bad_requests() {
        assert_eq!(
            credit_for_points(150, 463, iso::SGD),
            Err(WalletError::InsufficientPoints(
                PointsRejection::NotMultipleOfConversionUnit
            ))
        );

        assert_eq!(
            credit_for_points(0, 463, iso::SGD),
            Err(WalletError::InsufficientPoints(PointsRejection::NotPositive))
        );

        assert_eq!(
            credit_for_points(500, 463, iso::SGD),
            Err(WalletError::InsufficientPoints(
                PointsRejection::ExceedsBalance {
                    requested: 500,
                    available: 463
                }
            ))
        );
    }

    #[test]
    fn auto_conversion_keeps_remainder() {
        assert_eq!(auto_conversion(463), Some(400));
        assert_eq!(auto_conversion(100), Some(100));
        assert_eq!(auto_conversion(99), None);
        assert_eq!(auto_conversion(0), None);
    }

    #[test]
    fn accrual_auto_converts_largest_whole_unit() -> TestResult {
        let accrual = accrue_points(250, 120, true, iso::SGD)?;

        assert_eq!(accrual.balance, 70);
        assert_eq!(accrual.converted, 300);
        assert_eq!(accrual.credit, sgd(300));

        Ok(())
    }

    #[test]
    fn accrual_without_auto_convert_keeps_points() -> TestResult {
        let accrual = accrue_points(250, 120, false, iso::SGD)?;

        assert_eq!(accrual.balance, 370);
        assert_eq!(accrual.converted, 0);
        assert_eq!(accrual.credit, sgd(0));

        Ok(())
    }

    #[test]
    fn spending_points_fails_loudly() {
        assert_eq!(ensure_points(100, 100), Ok(()));
        assert_eq!(
            ensure_points(101, 100),
            Err(WalletError::InsufficientPoints(
                PointsRejection::ExceedsBalance {
                    requested: 101,
                    available: 100
                }
            ))
        );
    }

    #[test]
    fn top_up_bounds() {
        assert_eq!(validate_top_up(&sgd(5_000)), Ok(()));
        assert_eq!(validate_top_up(&sgd(MAX_TOP_UP_MINOR)), Ok(()));
        assert_eq!(
            validate_top_up(&sgd(0)),
            Err(WalletError::InvalidTopUp(TopUpRejection::NotPositive))
        );
        assert_eq!(
            validate_top_up(&sgd(MAX_TOP_UP_MINOR + 1)),
            Err(WalletError::InvalidTopUp(TopUpRejection::AboveMaximum))
        );
    }

    #[test]
    fn deduction_clamps_to_balance() -> TestResult {
        assert_eq!(clamped_deduction(sgd(5_000), sgd(3_000))?, sgd(3_000));
        assert_eq!(clamped_deduction(sgd(2_000), sgd(3_000))?, sgd(2_000));
        assert_eq!(clamped_deduction(sgd(2_000), sgd(-10))?, sgd(0));

        Ok(())
    }

    #[test]
    fn strict_spend_fails_loudly() {
        assert!(matches!(
            ensure_sufficient(&sgd(5_001), &sgd(5_000)),
            Err(WalletError::InsufficientFunds {
                requested: 5_001,
                available: 5_000
            })
        ));
        assert_eq!(ensure_sufficient(&sgd(5_000), &sgd(5_000)), Ok(()));
    }
}
