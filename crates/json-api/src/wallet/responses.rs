//! Wallet Responses

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::wallets::records::{
    PointsTransactionRecord, WalletRecord, WalletTransactionRecord,
};

use crate::amounts;

/// Wallet Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WalletResponse {
    pub e_wallet_balance: String,

    /// Loyalty points held
    pub points_balance: i64,

    pub store_credit: String,

    /// Whether earned points are converted to store credit automatically
    pub auto_convert_points: bool,
}

impl From<WalletRecord> for WalletResponse {
    fn from(wallet: WalletRecord) -> Self {
        Self {
            e_wallet_balance: amounts::format(wallet.e_wallet_balance),
            points_balance: wallet.points_balance,
            store_credit: amounts::format(wallet.store_credit),
            auto_convert_points: wallet.auto_convert_points,
        }
    }
}

/// Wallet Transaction Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WalletTransactionResponse {
    pub uuid: Uuid,

    pub amount: String,

    /// `top_up`, `deduction` or `refund`
    pub kind: String,

    /// `e_wallet` or `store_credit`
    pub instrument: String,

    /// `pending`, `completed` or `failed`
    pub status: String,

    pub payment_method: Option<String>,

    pub description: Option<String>,

    pub reference_id: String,

    pub created_at: String,
}

impl From<WalletTransactionRecord> for WalletTransactionResponse {
    fn from(transaction: WalletTransactionRecord) -> Self {
        Self {
            uuid: transaction.uuid.into_uuid(),
            amount: amounts::format(transaction.amount),
            kind: transaction.kind.as_str().to_string(),
            instrument: transaction.instrument.as_str().to_string(),
            status: transaction.status.as_str().to_string(),
            payment_method: transaction.payment_method,
            description: transaction.description,
            reference_id: transaction.reference_id,
            created_at: transaction.created_at.to_string(),
        }
    }
}

/// Points Transaction Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PointsTransactionResponse {
    pub uuid: Uuid,

    /// Positive when earned, negative when spent or converted
    pub points: i64,

    pub kind: String,

    pub description: String,

    pub purchase_uuid: Option<Uuid>,

    pub created_at: String,
}

impl From<PointsTransactionRecord> for PointsTransactionResponse {
    fn from(transaction: PointsTransactionRecord) -> Self {
        Self {
            uuid: transaction.uuid.into_uuid(),
            points: transaction.points,
            kind: transaction.kind.as_str().to_string(),
            description: transaction.description,
            purchase_uuid: transaction.purchase,
            created_at: transaction.created_at.to_string(),
        }
    }
}
