//! Wallet Data

use rusty_money::{Money, iso::Currency};
use uuid::Uuid;

use crate::domain::wallets::records::WalletInstrument;

/// Funds added to or taken from one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct FundsMovement {
    pub amount: Money<'static, Currency>,
    pub instrument: WalletInstrument,
    pub payment_method: Option<String>,
    pub description: String,
    pub reference: String,
}

/// Points earned, optionally attributed to a purchase.
///
/// Accrual for a given purchase is applied at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsCredit {
    pub points: i64,
    pub description: String,
    pub purchase: Option<Uuid>,
}

/// A requested e-wallet top-up awaiting payment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTopUp {
    pub amount: Money<'static, Currency>,
    pub payment_method: String,
}
