//! Checkout Responses

use salvo::{http::StatusError, oapi::ToSchema, prelude::Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront::{cart::CartLine, money::to_decimal_string, pricing::PricingError};
use storefront_app::checkout::{session::CheckoutSession, settlement::Settlement};

use crate::{extensions::*, purchases::responses::PurchaseResponse};

/// Render a checkout session.
pub(crate) fn checkout_response(
    session: CheckoutSession,
) -> Result<Json<CheckoutResponse>, StatusError> {
    CheckoutResponse::try_from(session)
        .map(Json)
        .or_500("failed to total checkout")
}

/// Checkout Response
///
/// The priced snapshot the customer is paying for.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutResponse {
    pub uuid: Uuid,

    pub lines: Vec<CheckoutLineResponse>,

    pub subtotal: String,

    pub tax: String,

    pub shipping: String,

    pub voucher_discount: String,

    /// Order total after any voucher discount
    pub total: String,

    /// The applied voucher code
    pub voucher_code: Option<String>,

    pub store_credit_used: String,

    pub e_wallet_used: String,

    /// Amount a card or payment gateway must collect
    pub remaining_for_gateway: String,

    /// Payment method of a started gateway payment
    pub payment_method: Option<String>,
}

impl TryFrom<CheckoutSession> for CheckoutResponse {
    type Error = PricingError;

    fn try_from(session: CheckoutSession) -> Result<Self, Self::Error> {
        let total = session.pricing.base_total()?;

        Ok(Self {
            uuid: session.uuid.into_uuid(),
            lines: session
                .lines
                .iter()
                .map(CheckoutLineResponse::from)
                .collect(),
            subtotal: to_decimal_string(&session.pricing.subtotal()),
            tax: to_decimal_string(&session.pricing.tax()),
            shipping: to_decimal_string(&session.pricing.shipping()),
            voucher_discount: to_decimal_string(&session.pricing.voucher_discount()),
            total: to_decimal_string(&total),
            voucher_code: session.voucher.map(|voucher| voucher.code),
            store_credit_used: to_decimal_string(&session.allocation.store_credit_used),
            e_wallet_used: to_decimal_string(&session.allocation.e_wallet_used),
            remaining_for_gateway: to_decimal_string(&session.allocation.remaining_for_gateway),
            payment_method: session
                .flow
                .map(|flow| flow.method().as_str().to_string()),
        })
    }
}

/// Checkout Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutLineResponse {
    pub product_uuid: Uuid,

    pub name: String,

    pub unit_price: String,

    pub quantity: u32,
}

impl From<&CartLine<'static>> for CheckoutLineResponse {
    fn from(line: &CartLine<'static>) -> Self {
        Self {
            product_uuid: line.product_id,
            name: line.name.clone(),
            unit_price: to_decimal_string(&line.unit_price),
            quantity: line.quantity,
        }
    }
}

/// Settlement Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SettlementResponse {
    pub purchase: PurchaseResponse,

    /// Set when the payment had already been settled; no side effects ran again
    pub replayed: bool,
}

impl From<Settlement> for SettlementResponse {
    fn from(settlement: Settlement) -> Self {
        Self {
            purchase: settlement.purchase.into(),
            replayed: settlement.replayed,
        }
    }
}
