//! Money
//!
//! Helpers for the single-currency amounts used throughout checkout.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{
    Money, MoneyError,
    iso::{self, Currency},
};
use thiserror::Error;

/// Errors raised by amount arithmetic.
#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// An amount overflowed the minor unit range.
    #[error("amount overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Text was not a decimal amount with at most two decimal places.
    #[error("invalid amount {0:?}")]
    Invalid(String),
}

/// The storefront's trading currency.
pub fn currency() -> &'static Currency {
    iso::SGD
}

/// Build an amount in the trading currency from minor units (cents).
pub fn sgd(minor: i64) -> Money<'static, Currency> {
    Money::from_minor(minor, iso::SGD)
}

/// A zero amount in the given currency.
pub fn zero(currency: &Currency) -> Money<'_, Currency> {
    Money::from_minor(0, currency)
}

/// Calculate a percentage of a minor unit amount, rounding half away from zero.
///
/// # Errors
///
/// Returns [`AmountError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, AmountError> {
    let minor = Decimal::from_i64(minor).ok_or(AmountError::PercentConversion)?;

    ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(AmountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(AmountError::PercentConversion)
}

/// Calculate a percentage of an amount.
///
/// # Errors
///
/// Returns [`AmountError::PercentConversion`] if the calculation overflows.
pub fn percent_of<'a>(
    amount: &Money<'a, Currency>,
    percent: &Percentage,
) -> Result<Money<'a, Currency>, AmountError> {
    let minor = percent_of_minor(percent, amount.to_minor_units())?;

    Ok(Money::from_minor(minor, amount.currency()))
}

/// Multiply an amount by a whole quantity.
///
/// # Errors
///
/// Returns [`AmountError::Overflow`] if the product does not fit in minor units.
pub fn times<'a>(
    amount: &Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, AmountError> {
    let minor = amount
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(AmountError::Overflow)?;

    Ok(Money::from_minor(minor, amount.currency()))
}

/// The smaller of two amounts.
///
/// # Errors
///
/// Returns [`AmountError::Money`] if the currencies differ.
pub fn min_amount<'a>(
    left: Money<'a, Currency>,
    right: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, AmountError> {
    ensure_same_currency(&left, &right)?;

    if right.to_minor_units() < left.to_minor_units() {
        Ok(right)
    } else {
        Ok(left)
    }
}

/// Clamp an amount to be at least zero.
pub fn non_negative(amount: Money<'_, Currency>) -> Money<'_, Currency> {
    if amount.to_minor_units() < 0 {
        zero(amount.currency())
    } else {
        amount
    }
}

/// Render an amount as a plain two decimal place string (e.g. `"107.00"`).
pub fn to_decimal_string(amount: &Money<'_, Currency>) -> String {
    let exponent = amount.currency().exponent;

    Decimal::new(amount.to_minor_units(), exponent).to_string()
}

/// Parse a decimal amount such as `"46.30"` in the trading currency.
///
/// # Errors
///
/// Returns [`AmountError::Invalid`] if the text is not a number or has more decimal places
/// than the currency allows, and [`AmountError::Overflow`] if it does not fit in minor units.
pub fn parse_amount(value: &str) -> Result<Money<'static, Currency>, AmountError> {
    let invalid = || AmountError::Invalid(value.to_string());

    let decimal: Decimal = value.trim().parse().map_err(|_| invalid())?;
    let exponent = currency().exponent;

    if decimal.scale() > exponent {
        return Err(invalid());
    }

    let minor = decimal
        .checked_mul(Decimal::from(10_i64.pow(exponent)))
        .and_then(|scaled| scaled.to_i64())
        .ok_or(AmountError::Overflow)?;

    Ok(sgd(minor))
}

fn ensure_same_currency(
    left: &Money<'_, Currency>,
    right: &Money<'_, Currency>,
) -> Result<(), AmountError> {
    if left.currency() == right.currency() {
        Ok(())
    } else {
        Err(AmountError::Money(MoneyError::CurrencyMismatch {
            expected: left.currency().iso_alpha_code,
            actual: right.currency().iso_alpha_code,
        }))
    }
}
