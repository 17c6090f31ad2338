//! Cart Responses

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::carts::records::CartItemRecord;

use crate::amounts;

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    /// The unique identifier of the cart item
    pub uuid: Uuid,

    /// The unique identifier of the product in the cart item
    pub product_uuid: Uuid,

    /// Current catalog name
    pub product_name: String,

    /// Current catalog price
    pub unit_price: String,

    pub quantity: u32,

    pub line_total: String,
}

impl From<CartItemRecord> for CartItemResponse {
    fn from(item: CartItemRecord) -> Self {
        let line_total = item.unit_price.saturating_mul(i64::from(item.quantity));

        Self {
            uuid: item.uuid.into_uuid(),
            product_uuid: item.product.into_uuid(),
            product_name: item.product_name,
            unit_price: amounts::format(item.unit_price),
            quantity: item.quantity,
            line_total: amounts::format(line_total),
        }
    }
}
