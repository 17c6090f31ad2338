//! Amounts on the wire.
//!
//! Amounts are decimal strings in the trading currency, e.g. `"107.00"`.

use rusty_money::{Money, iso::Currency};
use salvo::prelude::StatusError;
use storefront::money::{parse_amount, sgd, to_decimal_string};

/// Render minor units as a decimal string.
pub(crate) fn format(minor: i64) -> String {
    to_decimal_string(&sgd(minor))
}

/// Parse a request amount, rejecting malformed text with a 400.
pub(crate) fn parse(field: &str, value: &str) -> Result<Money<'static, Currency>, StatusError> {
    parse_amount(value)
        .map_err(|error| StatusError::bad_request().brief(format!("{field}: {error}")))
}
