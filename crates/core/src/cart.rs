//! Cart

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use uuid::Uuid;

use crate::money::{AmountError, times, zero};

/// Errors related to cart construction or totals.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line was added with a quantity of zero.
    #[error("Line {0} has a zero quantity")]
    ZeroQuantity(usize),

    /// The cart has no lines.
    #[error("cart is empty")]
    Empty,

    /// Wrapped amount arithmetic error.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// A product line in a user's cart.
///
/// Name and unit price are captured when the cart is read so later catalog changes do not alter
/// a checkout in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    /// Catalog product identifier
    pub product_id: Uuid,

    /// Product name at the time the cart was read
    pub name: String,

    /// Unit price at the time the cart was read
    pub unit_price: Money<'a, Currency>,

    /// Number of units
    pub quantity: u32,
}

impl<'a> CartLine<'a> {
    /// Create a new cart line.
    pub fn new(
        product_id: Uuid,
        name: impl Into<String>,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Amount`] if the line total overflows.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, CartError> {
        Ok(times(&self.unit_price, self.quantity)?)
    }
}

/// A priced snapshot of a user's cart.
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    lines: SmallVec<[CartLine<'a>; 8]>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: SmallVec::new(),
            currency,
        }
    }

    /// Create a cart from the given lines.
    ///
    /// Lines for the same product are merged, keeping the first line's name and price.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a line has a different currency or a zero quantity.
    pub fn with_lines(
        lines: impl IntoIterator<Item = CartLine<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let mut cart = Self::new(currency);
        let mut positions: FxHashMap<Uuid, usize> = FxHashMap::default();

        for (idx, line) in lines.into_iter().enumerate() {
            let line_currency = line.unit_price.currency();

            if line_currency != currency {
                return Err(CartError::CurrencyMismatch(
                    idx,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if line.quantity == 0 {
                return Err(CartError::ZeroQuantity(idx));
            }

            if let Some(existing) = positions
                .get(&line.product_id)
                .and_then(|&pos| cart.lines.get_mut(pos))
            {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or(CartError::Amount(AmountError::Overflow))?;

                continue;
            }

            positions.insert(line.product_id, cart.lines.len());
            cart.lines.push(line);
        }

        Ok(cart)
    }

    /// Lines in the cart.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Number of distinct lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Sum of every line total.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Empty`] for an empty cart, or an amount error if the sum overflows.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        if self.lines.is_empty() {
            return Err(CartError::Empty);
        }

        self.lines.iter().try_fold(zero(self.currency), |acc, line| {
            Ok(acc.add(line.line_total()?).map_err(AmountError::from)?)
        })
    }

    /// Consume the cart, returning its lines.
    pub fn into_lines(self) -> Vec<CartLine<'a>> {
        self.lines.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::money::sgd;

    use super::*;

    fn line(price: i64, quantity: u32) -> CartLine<'static> {
        CartLine::new(Uuid::now_v7(), "Widget", sgd(price), quantity)
    }

    #[test]
    fn subtotal_sums_line_totals() -> TestResult {
        let cart = Cart::with_lines([line(1_250, 2), line(7_500, 1)], iso::SGD)?;

        assert_eq!(cart.subtotal()?, sgd(10_000));

        Ok(())
    }

    #[test]
    fn subtotal_of_empty_cart_errors() {
        let cart = Cart::new(iso::SGD);

        assert_eq!(cart.subtotal(), Err(CartError::Empty));
    }

    #[test]
    fn duplicate_products_are_merged() -> TestResult {
        let product = Uuid::now_v7();

        let cart = Cart::with_lines(
            [
                CartLine::new(product, "Mug", sgd(800), 1),
                CartLine::new(product, "Mug", sgd(800), 2),
            ],
            iso::SGD,
        )?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines().first().map(|l| l.quantity), Some(3));
        assert_eq!(cart.subtotal()?, sgd(2_400));

        Ok(())
    }

    #[test]
    fn currency_mismatch_is_rejected() {
        let result = Cart::with_lines(
            [
                line(100, 1),
                CartLine::new(Uuid::now_v7(), "Tea", Money::from_minor(100, iso::GBP), 1),
            ],
            iso::SGD,
        );

        assert!(
            matches!(result, Err(CartError::CurrencyMismatch(1, "GBP", "SGD"))),
            "expected currency mismatch, got {result:?}"
        );
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let result = Cart::with_lines([line(100, 0)], iso::SGD);

        assert!(
            matches!(result, Err(CartError::ZeroQuantity(0))),
            "expected zero quantity, got {result:?}"
        );
    }
}
