//! Cart Records

use jiff::Timestamp;
use storefront::{
    cart::{Cart, CartError, CartLine},
    money::{currency, sgd},
};

use crate::{
    domain::{products::records::ProductUuid, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// A cart line joined with the catalog at read time.
#[derive(Debug, Clone)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub user: UserUuid,
    pub product: ProductUuid,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartItemRecord {
    /// Snapshot this item as a priced cart line.
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

/// Build a priced cart from stored items.
///
/// # Errors
///
/// Returns a [`CartError`] if an item has a zero quantity.
pub fn to_cart(items: &[CartItemRecord]) -> Result<Cart<'static>, CartError> {
    Cart::with_lines(items.iter().map(CartItemRecord::to_cart_line), currency())
}
