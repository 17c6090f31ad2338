//! Cards
//!
//! Format checks for card details. No authorisation takes place; a card that passes is settled
//! immediately.

use jiff::civil::Date;
use thiserror::Error;

/// Why card details were rejected.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CardError {
    /// Cardholder name was blank.
    #[error("cardholder name is required")]
    MissingHolder,

    /// Card number contains something other than digits, spaces or dashes.
    #[error("card number must contain only digits")]
    InvalidNumber,

    /// Card number has the wrong number of digits.
    #[error("card number must be 13 to 19 digits")]
    InvalidNumberLength,

    /// Expiry is not `MM/YY` or `MM/YYYY`.
    #[error("expiry must be in MM/YY format")]
    InvalidExpiry,

    /// Expiry month is in the past.
    #[error("card has expired")]
    Expired,

    /// CVV is not three or four digits.
    #[error("CVV must be 3 or 4 digits")]
    InvalidCvv,
}

/// Card details as entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    /// Name printed on the card
    pub holder_name: String,

    /// Card number, optionally grouped with spaces or dashes
    pub number: String,

    /// Expiry as `MM/YY` or `MM/YYYY`
    pub expiry: String,

    /// Card verification value
    pub cvv: String,
}

/// Card details that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCard {
    last4: String,
}

impl ValidatedCard {
    /// Last four digits of the card number, for receipts.
    pub fn last4(&self) -> &str {
        &self.last4
    }

    /// Payment details recorded against the purchase.
    pub fn masked(&self) -> String {
        format!("Card ending {}", self.last4)
    }
}

impl CardDetails {
    /// Validate format and expiry against `today`.
    ///
    /// # Errors
    ///
    /// Returns the first [`CardError`] found.
    pub fn validate(&self, today: Date) -> Result<ValidatedCard, CardError> {
        if self.holder_name.trim().is_empty() {
            return Err(CardError::MissingHolder);
        }

        let digits = normalise_number(&self.number)?;

        if !(13..=19).contains(&digits.len()) {
            return Err(CardError::InvalidNumberLength);
        }

        let (month, year) = parse_expiry(&self.expiry)?;

        if (year, month) < (today.year(), today.month()) {
            return Err(CardError::Expired);
        }

        let cvv = self.cvv.trim();

        if !(3..=4).contains(&cvv.len()) || !cvv.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CardError::InvalidCvv);
        }

        let last4 = digits
            .get(digits.len().saturating_sub(4)..)
            .unwrap_or_default()
            .to_string();

        Ok(ValidatedCard { last4 })
    }
}

fn normalise_number(number: &str) -> Result<String, CardError> {
    let mut digits = String::with_capacity(number.len());

    for ch in number.trim().chars() {
        match ch {
            '0'..='9' => digits.push(ch),
            ' ' | '-' => {}
            _ => return Err(CardError::InvalidNumber),
        }
    }

    Ok(digits)
}

fn parse_expiry(expiry: &str) -> Result<(i8, i16), CardError> {
    let (month, year) = expiry
        .trim()
        .split_once('/')
        .ok_or(CardError::InvalidExpiry)?;

    let month: i8 = month
        .trim()
        .parse()
        .map_err(|_parse| CardError::InvalidExpiry)?;

    if !(1..=12).contains(&month) {
        return Err(CardError::InvalidExpiry);
    }

    let year_digits = year.trim();
    let year: i16 = year_digits
        .parse()
        .map_err(|_parse| CardError::InvalidExpiry)?;

    let year = match year_digits.len() {
        2 => 2000 + year,
        4 => year,
        _ => return Err(CardError::InvalidExpiry),
    };

    Ok((month, year))
}
