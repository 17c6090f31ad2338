//! Allocation
//!
//! Splits an order total across store credit, e-wallet balance and an external gateway.

use std::{fmt, str::FromStr};

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::money::{AmountError, min_amount, non_negative, to_decimal_string};

/// Payment methods recorded against a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card details validated and settled immediately.
    Card,

    /// Redirect-and-capture checkout through `PayPal`.
    PayPal,

    /// NETS QR code confirmed asynchronously.
    NetsQr,

    /// Fully covered by store credit and e-wallet balance.
    StoreCreditAndWallet,
}

impl PaymentMethod {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::PayPal => "paypal",
            Self::NetsQr => "nets_qr",
            Self::StoreCreditAndWallet => "store_credit_and_wallet",
        }
    }

    /// Human readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Card => "Credit/Debit card",
            Self::PayPal => "PayPal",
            Self::NetsQr => "NETS QR",
            Self::StoreCreditAndWallet => "Store Credit + Wallet",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = AllocationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "card" => Ok(Self::Card),
            "paypal" => Ok(Self::PayPal),
            "nets_qr" => Ok(Self::NetsQr),
            "store_credit_and_wallet" => Ok(Self::StoreCreditAndWallet),
            other => Err(AllocationError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Errors raised while allocating instruments.
#[derive(Debug, Error, PartialEq)]
pub enum AllocationError {
    /// A stored payment method was not recognised.
    #[error("unknown payment method {0:?}")]
    UnknownPaymentMethod(String),

    /// Wrapped amount arithmetic error.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

impl From<rusty_money::MoneyError> for AllocationError {
    fn from(error: rusty_money::MoneyError) -> Self {
        Self::Amount(AmountError::Money(error))
    }
}

/// Internal instruments the client asked to use, with the amount requested for each.
///
/// `None` means the instrument was not selected. Requested amounts are upper bounds; the
/// allocator never uses more than the authoritative balance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageRequest<'a> {
    /// Requested store credit
    pub store_credit: Option<Money<'a, Currency>>,

    /// Requested e-wallet balance
    pub e_wallet: Option<Money<'a, Currency>>,
}

/// Authoritative wallet balances read at allocation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvailableBalances<'a> {
    /// Store credit available
    pub store_credit: Money<'a, Currency>,

    /// E-wallet balance available
    pub e_wallet: Money<'a, Currency>,
}

/// A funding source for part of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instrument {
    /// Store credit
    StoreCredit,

    /// E-wallet balance
    EWallet,

    /// External payment gateway
    Gateway,
}

/// How an order total is split across instruments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation<'a> {
    /// Store credit to deduct on settlement
    pub store_credit_used: Money<'a, Currency>,

    /// E-wallet balance to deduct on settlement
    pub e_wallet_used: Money<'a, Currency>,

    /// Amount the external gateway must collect
    pub remaining_for_gateway: Money<'a, Currency>,
}

impl<'a> Allocation<'a> {
    /// Returns true if no external gateway call is needed.
    pub fn is_internally_funded(&self) -> bool {
        self.remaining_for_gateway.to_minor_units() == 0
    }

    /// The payment method to record, replacing the selected one when no gateway is involved.
    pub fn effective_method(&self, selected: PaymentMethod) -> PaymentMethod {
        if self.is_internally_funded() {
            PaymentMethod::StoreCreditAndWallet
        } else {
            selected
        }
    }

    /// Instruments with a non-zero share, in deduction order.
    pub fn instruments(&self) -> SmallVec<[(Instrument, Money<'a, Currency>); 3]> {
        [
            (Instrument::StoreCredit, self.store_credit_used),
            (Instrument::EWallet, self.e_wallet_used),
            (Instrument::Gateway, self.remaining_for_gateway),
        ]
        .into_iter()
        .filter(|(_, amount)| amount.to_minor_units() > 0)
        .collect()
    }

    /// Audit description of the internal instruments and voucher used.
    pub fn describe(&self, voucher: Option<(&str, &Money<'a, Currency>)>) -> String {
        let mut parts: SmallVec<[String; 3]> = SmallVec::new();

        if self.store_credit_used.to_minor_units() > 0 {
            parts.push(format!(
                "Store credit -${}",
                to_decimal_string(&self.store_credit_used)
            ));
        }

        if self.e_wallet_used.to_minor_units() > 0 {
            parts.push(format!(
                "E-wallet -${}",
                to_decimal_string(&self.e_wallet_used)
            ));
        }

        if let Some((code, discount)) = voucher
            && discount.to_minor_units() > 0
        {
            parts.push(format!("Voucher {code} (-${})", to_decimal_string(discount)));
        }

        parts.join(" | ")
    }
}

/// Split `base_total` across store credit, e-wallet and the gateway.
///
/// Store credit is drawn first, then e-wallet, each bounded by the request, the live balance
/// and what remains of the total. Negative requests or balances count as zero.
///
/// # Errors
///
/// Returns an [`AllocationError`] if currencies differ.
pub fn allocate<'a>(
    base_total: Money<'a, Currency>,
    request: &UsageRequest<'a>,
    balances: &AvailableBalances<'a>,
) -> Result<Allocation<'a>, AllocationError> {
    let base_total = non_negative(base_total);
    let none = Money::from_minor(0, base_total.currency());

    let store_credit_used = match request.store_credit {
        Some(requested) => min_amount(
            min_amount(non_negative(requested), non_negative(balances.store_credit))?,
            base_total,
        )?,
        None => none,
    };

    let remaining = base_total.sub(store_credit_used)?;

    let e_wallet_used = match request.e_wallet {
        Some(requested) => min_amount(
            min_amount(non_negative(requested), non_negative(balances.e_wallet))?,
            remaining,
        )?,
        None => none,
    };

    let remaining_for_gateway = non_negative(remaining.sub(e_wallet_used)?);

    Ok(Allocation {
        store_credit_used,
        e_wallet_used,
        remaining_for_gateway,
    })
}
