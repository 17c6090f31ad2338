//! Pricing
//!
//! Tax, shipping and voucher discount for an order.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    money::{AmountError, non_negative, percent_of, zero},
};

/// Orders with a subtotal strictly above this ship for free (minor units).
pub const FREE_SHIPPING_THRESHOLD_MINOR: i64 = 5_000;

/// Flat shipping fee below the free shipping threshold (minor units).
pub const FLAT_SHIPPING_MINOR: i64 = 500;

/// Errors raised while pricing an order.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The cart could not be totalled.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapped amount arithmetic error.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

impl From<rusty_money::MoneyError> for PricingError {
    fn from(error: rusty_money::MoneyError) -> Self {
        Self::Amount(AmountError::Money(error))
    }
}

/// Sales tax rate applied to the subtotal.
pub fn tax_rate() -> Percentage {
    Percentage::from(Decimal::new(7, 2))
}

/// Shipping charged for a given subtotal.
pub fn shipping_for<'a>(subtotal: &Money<'a, Currency>) -> Money<'a, Currency> {
    let minor = if subtotal.to_minor_units() > FREE_SHIPPING_THRESHOLD_MINOR {
        0
    } else {
        FLAT_SHIPPING_MINOR
    };

    Money::from_minor(minor, subtotal.currency())
}

/// Computed amounts for an order before any instrument allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderPricing<'a> {
    subtotal: Money<'a, Currency>,
    tax: Money<'a, Currency>,
    shipping: Money<'a, Currency>,
    voucher_discount: Money<'a, Currency>,
}

impl<'a> OrderPricing<'a> {
    /// Price an order from its subtotal with no voucher applied.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the tax calculation overflows.
    pub fn for_subtotal(subtotal: Money<'a, Currency>) -> Result<Self, PricingError> {
        let tax = percent_of(&subtotal, &tax_rate())?;

        Ok(Self {
            subtotal,
            tax,
            shipping: shipping_for(&subtotal),
            voucher_discount: zero(subtotal.currency()),
        })
    }

    /// Price a cart with no voucher applied.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart is empty or cannot be totalled.
    pub fn for_cart(cart: &Cart<'a>) -> Result<Self, PricingError> {
        Self::for_subtotal(cart.subtotal()?)
    }

    /// Rebuild a pricing from stored components.
    pub fn from_parts(
        subtotal: Money<'a, Currency>,
        tax: Money<'a, Currency>,
        shipping: Money<'a, Currency>,
        voucher_discount: Money<'a, Currency>,
    ) -> Self {
        Self {
            subtotal,
            tax,
            shipping,
            voucher_discount,
        }
    }

    /// Sum of all line totals
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Sales tax
    pub fn tax(&self) -> Money<'a, Currency> {
        self.tax
    }

    /// Shipping fee
    pub fn shipping(&self) -> Money<'a, Currency> {
        self.shipping
    }

    /// Discount realised by the applied voucher, zero when none is applied
    pub fn voucher_discount(&self) -> Money<'a, Currency> {
        self.voucher_discount
    }

    /// Subtotal plus tax and shipping: the amount a voucher is evaluated against.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the sum overflows.
    pub fn pre_discount_total(&self) -> Result<Money<'a, Currency>, PricingError> {
        Ok(self.subtotal.add(self.tax)?.add(self.shipping)?)
    }

    /// Pre-discount total less the voucher discount, never negative.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the arithmetic fails.
    pub fn base_total(&self) -> Result<Money<'a, Currency>, PricingError> {
        Ok(non_negative(
            self.pre_discount_total()?.sub(self.voucher_discount)?,
        ))
    }

    /// Copy of this pricing with the given voucher discount.
    #[must_use]
    pub fn with_voucher_discount(self, discount: Money<'a, Currency>) -> Self {
        Self {
            voucher_discount: discount,
            ..self
        }
    }

    /// Copy of this pricing with the voucher discount removed.
    #[must_use]
    pub fn without_voucher(self) -> Self {
        Self {
            voucher_discount: zero(self.subtotal.currency()),
            ..self
        }
    }

    /// Returns true if a non-zero voucher discount is applied.
    pub fn has_voucher_discount(&self) -> bool {
        self.voucher_discount.to_minor_units() > 0
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::money::sgd;

    use super::*;

    #[test]
    fn large_subtotal_ships_free() -> TestResult {
        let pricing = OrderPricing::for_subtotal(sgd(10_000))?;

        assert_eq!(pricing.tax(), sgd(700));
        assert_eq!(pricing.shipping(), sgd(0));
        assert_eq!(pricing.base_total()?, sgd(10_700));

        Ok(())
    }

    #[test]
    fn small_subtotal_pays_flat_shipping() -> TestResult {
        let pricing = OrderPricing::for_subtotal(sgd(2_000))?;

        assert_eq!(pricing.tax(), sgd(140));
        assert_eq!(pricing.shipping(), sgd(500));
        assert_eq!(pricing.pre_discount_total()?, sgd(2_640));

        Ok(())
    }

    #[test]
    fn threshold_is_exclusive() {
        assert_eq!(shipping_for(&sgd(5_000)), sgd(500));
        assert_eq!(shipping_for(&sgd(5_001)), sgd(0));
    }

    #[test]
    fn clearing_voucher_restores_pre_voucher_total() -> TestResult {
        let pricing = OrderPricing::for_subtotal(sgd(10_000))?;
        let before = pricing.base_total()?;

        let discounted = pricing.with_voucher_discount(sgd(1_070));

        assert_eq!(discounted.base_total()?, sgd(9_630));
        assert!(discounted.has_voucher_discount());

        let cleared = discounted.without_voucher();

        assert_eq!(cleared.base_total()?, before);
        assert!(!cleared.has_voucher_discount());

        Ok(())
    }

    #[test]
    fn base_total_never_negative() -> TestResult {
        let pricing = OrderPricing::for_subtotal(sgd(1_000))?.with_voucher_discount(sgd(99_999));

        assert_eq!(pricing.base_total()?, sgd(0));

        Ok(())
    }
}
