//! Wallet Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use storefront::{allocation::AvailableBalances, money::sgd};
use thiserror::Error;
use uuid::Uuid;

use crate::{domain::users::records::UserUuid, uuids::TypedUuid};

/// A stored enum value that is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} {value:?}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Balances held by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletRecord {
    pub user: UserUuid,
    pub e_wallet_balance: i64,
    pub points_balance: i64,
    pub store_credit: i64,
    pub auto_convert_points: bool,
}

impl WalletRecord {
    #[must_use]
    pub fn e_wallet(&self) -> Money<'static, Currency> {
        sgd(self.e_wallet_balance)
    }

    #[must_use]
    pub fn credit(&self) -> Money<'static, Currency> {
        sgd(self.store_credit)
    }

    /// Balances available to the payment allocator.
    #[must_use]
    pub fn available(&self) -> AvailableBalances<'static> {
        AvailableBalances {
            store_credit: self.credit(),
            e_wallet: self.e_wallet(),
        }
    }

    #[must_use]
    pub fn balance_of(&self, instrument: WalletInstrument) -> Money<'static, Currency> {
        match instrument {
            WalletInstrument::EWallet => self.e_wallet(),
            WalletInstrument::StoreCredit => self.credit(),
        }
    }
}

/// Which stored balance a movement applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletInstrument {
    EWallet,
    StoreCredit,
}

impl WalletInstrument {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EWallet => "e_wallet",
            Self::StoreCredit => "store_credit",
        }
    }
}

impl fmt::Display for WalletInstrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletInstrument {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "e_wallet" => Ok(Self::EWallet),
            "store_credit" => Ok(Self::StoreCredit),
            other => Err(UnknownVariant::new("wallet instrument", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletTransactionKind {
    TopUp,
    Deduction,
    Refund,
}

impl WalletTransactionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopUp => "top_up",
            Self::Deduction => "deduction",
            Self::Refund => "refund",
        }
    }
}

impl FromStr for WalletTransactionKind {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "top_up" => Ok(Self::TopUp),
            "deduction" => Ok(Self::Deduction),
            "refund" => Ok(Self::Refund),
            other => Err(UnknownVariant::new("wallet transaction kind", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletTransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl WalletTransactionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for WalletTransactionStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownVariant::new("wallet transaction status", other)),
        }
    }
}

/// Wallet Transaction UUID
pub type WalletTransactionUuid = TypedUuid<WalletTransactionRecord>;

/// One movement of e-wallet balance or store credit.
#[derive(Debug, Clone)]
pub struct WalletTransactionRecord {
    pub uuid: WalletTransactionUuid,
    pub user: UserUuid,
    pub amount: i64,
    pub kind: WalletTransactionKind,
    pub instrument: WalletInstrument,
    pub status: WalletTransactionStatus,
    pub payment_method: Option<String>,
    pub description: Option<String>,
    pub reference_id: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsTransactionKind {
    Earned,
    Spent,
    Redeemed,
    Refund,
}

impl PointsTransactionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Earned => "earned",
            Self::Spent => "spent",
            Self::Redeemed => "redeemed",
            Self::Refund => "refund",
        }
    }
}

impl FromStr for PointsTransactionKind {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "earned" => Ok(Self::Earned),
            "spent" => Ok(Self::Spent),
            "redeemed" => Ok(Self::Redeemed),
            "refund" => Ok(Self::Refund),
            other => Err(UnknownVariant::new("points transaction kind", other)),
        }
    }
}

/// Points Transaction UUID
pub type PointsTransactionUuid = TypedUuid<PointsTransactionRecord>;

/// One movement of loyalty points.
///
/// `points` is signed: positive for earning, negative for spending and conversion.
#[derive(Debug, Clone)]
pub struct PointsTransactionRecord {
    pub uuid: PointsTransactionUuid,
    pub user: UserUuid,
    pub points: i64,
    pub kind: PointsTransactionKind,
    pub description: String,
    pub purchase: Option<Uuid>,
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_names_parse_back() {
        for kind in [
            WalletTransactionKind::TopUp,
            WalletTransactionKind::Deduction,
            WalletTransactionKind::Refund,
        ] {
            assert_eq!(kind.as_str().parse::<WalletTransactionKind>(), Ok(kind));
        }

        assert_eq!("store_credit".parse(), Ok(WalletInstrument::StoreCredit));
        assert_eq!(
            "cash".parse::<WalletInstrument>(),
            Err(UnknownVariant::new("wallet instrument", "cash"))
        );
    }

    #[test]
    fn available_balances_mirror_stored_values() {
        let wallet = WalletRecord {
            user: UserUuid::new(),
            e_wallet_balance: 8_000,
            points_balance: 70,
            store_credit: 1_250,
            auto_convert_points: true,
        };

        let available = wallet.available();

        assert_eq!(available.e_wallet, sgd(8_000));
        assert_eq!(available.store_credit, sgd(1_250));
        assert_eq!(wallet.balance_of(WalletInstrument::StoreCredit), sgd(1_250));
    }
}
