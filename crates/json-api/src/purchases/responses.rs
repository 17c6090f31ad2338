//! Purchase Responses

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::purchases::records::{PurchaseLineRecord, PurchaseRecord};

use crate::amounts;

/// Purchase Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PurchaseResponse {
    /// The unique identifier of the purchase
    pub uuid: Uuid,

    /// Sum of line totals
    pub subtotal: String,

    pub tax: String,

    pub shipping: String,

    pub voucher_discount: String,

    /// Paid from store credit
    pub store_credit_used: String,

    /// Paid from the e-wallet
    pub e_wallet_used: String,

    /// Charged to the payment method
    pub total: String,

    /// `card`, `paypal`, `nets_qr` or `store_credit_and_wallet`
    pub payment_method: String,

    pub payment_details: String,

    pub points_earned: i64,

    /// The date and time the purchase was settled
    pub created_at: String,

    pub lines: Vec<PurchaseLineResponse>,
}

impl From<PurchaseRecord> for PurchaseResponse {
    fn from(purchase: PurchaseRecord) -> Self {
        Self {
            uuid: purchase.uuid.into_uuid(),
            subtotal: amounts::format(purchase.subtotal),
            tax: amounts::format(purchase.tax),
            shipping: amounts::format(purchase.shipping),
            voucher_discount: amounts::format(purchase.voucher_discount),
            store_credit_used: amounts::format(purchase.store_credit_used),
            e_wallet_used: amounts::format(purchase.e_wallet_used),
            total: amounts::format(purchase.total),
            payment_method: purchase.payment_method.as_str().to_string(),
            payment_details: purchase.payment_details,
            points_earned: purchase.points_earned,
            created_at: purchase.created_at.to_string(),
            lines: purchase
                .lines
                .into_iter()
                .map(PurchaseLineResponse::from)
                .collect(),
        }
    }
}

/// Purchase Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PurchaseLineResponse {
    pub product_uuid: Uuid,

    /// Product name at the time of purchase
    pub product_name: String,

    pub unit_price: String,

    pub quantity: u32,

    pub line_total: String,
}

impl From<PurchaseLineRecord> for PurchaseLineResponse {
    fn from(line: PurchaseLineRecord) -> Self {
        Self {
            product_uuid: line.product.into_uuid(),
            product_name: line.product_name,
            unit_price: amounts::format(line.unit_price),
            quantity: line.quantity,
            line_total: amounts::format(line.line_total),
        }
    }
}
