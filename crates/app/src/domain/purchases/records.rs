//! Purchase Records

use jiff::Timestamp;
use storefront::{
    allocation::{Allocation, PaymentMethod},
    cart::CartLine,
    money::sgd,
    pricing::OrderPricing,
    receipt::{Receipt, ReceiptError},
};

use crate::{
    domain::{
        products::records::ProductUuid,
        users::records::{UserRecord, UserUuid},
        vouchers::records::VoucherClaimUuid,
    },
    uuids::TypedUuid,
};

/// Purchase UUID
pub type PurchaseUuid = TypedUuid<PurchaseRecord>;

/// A settled order. Amounts are minor units.
#[derive(Debug, Clone)]
pub struct PurchaseRecord {
    pub uuid: PurchaseUuid,
    pub user: UserUuid,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping: i64,
    pub voucher_discount: i64,
    pub store_credit_used: i64,
    pub e_wallet_used: i64,
    pub total: i64,
    pub payment_method: PaymentMethod,
    pub payment_details: String,
    pub gateway_reference: String,
    pub voucher_claim: Option<VoucherClaimUuid>,
    pub points_earned: i64,
    pub created_at: Timestamp,
    pub lines: Vec<PurchaseLineRecord>,
}

impl PurchaseRecord {
    #[must_use]
    pub fn pricing(&self) -> OrderPricing<'static> {
        OrderPricing::from_parts(
            sgd(self.subtotal),
            sgd(self.tax),
            sgd(self.shipping),
            sgd(self.voucher_discount),
        )
    }

    #[must_use]
    pub fn allocation(&self) -> Allocation<'static> {
        Allocation {
            store_credit_used: sgd(self.store_credit_used),
            e_wallet_used: sgd(self.e_wallet_used),
            remaining_for_gateway: sgd(self.total),
        }
    }

    /// Rebuild the printable receipt.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the stored lines do not add up to the subtotal.
    pub fn receipt(&self) -> Result<Receipt<'static>, ReceiptError> {
        Receipt::new(
            self.lines.iter().map(PurchaseLineRecord::to_cart_line),
            self.pricing(),
            self.allocation(),
            self.payment_method,
        )
    }
}

/// Purchase Line UUID
pub type PurchaseLineUuid = TypedUuid<PurchaseLineRecord>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseLineRecord {
    pub uuid: PurchaseLineUuid,
    pub product: ProductUuid,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: u32,
    pub line_total: i64,
}

impl PurchaseLineRecord {
    #[must_use]
    pub fn to_cart_line(&self) -> CartLine<'static> {
        CartLine::new(
            self.product.into_uuid(),
            self.product_name.clone(),
            sgd(self.unit_price),
            self.quantity,
        )
    }
}

/// A purchase with its customer, for admin listings. Lines are not loaded.
#[derive(Debug, Clone)]
pub struct CustomerPurchaseRecord {
    pub purchase: PurchaseRecord,
    pub customer: UserRecord,
}
