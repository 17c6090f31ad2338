//! Checkout errors.

use storefront::{
    allocation::AllocationError, cards::CardError, cart::CartError, pricing::PricingError,
    receipt::ReceiptError, vouchers::VoucherError,
};
use thiserror::Error;

use crate::{
    domain::{
        carts::CartsServiceError, purchases::PurchasesServiceError, vouchers::VouchersServiceError,
        wallets::WalletsServiceError,
    },
    gateways::GatewayError,
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("no checkout in progress")]
    NoSession,

    #[error("checkout is already being settled")]
    InProgress,

    #[error("a payment for the current checkout is awaiting completion; abandon it first")]
    PaymentPending,

    #[error("cart is empty")]
    EmptyCart,

    #[error("payment does not match the checkout in progress")]
    FlowMismatch,

    #[error("order still needs {remaining} from a payment gateway")]
    GatewayRequired { remaining: String },

    #[error("order is fully covered by store credit and e-wallet")]
    NothingToCharge,

    #[error(transparent)]
    Card(#[from] CardError),

    #[error(transparent)]
    Voucher(#[from] VoucherError),

    #[error("voucher cannot be applied")]
    VoucherClaim(#[from] VouchersServiceError),

    #[error("payment was declined: {0}")]
    Declined(String),

    #[error("payment capture failed: {0}")]
    CaptureFailed(String),

    #[error("QR payment failed: {0}")]
    QrFailed(String),

    #[error("payment gateway error")]
    Gateway(#[from] GatewayError),

    #[error("failed to price order")]
    Pricing(#[from] PricingError),

    #[error("failed to allocate payment")]
    Allocation(#[from] AllocationError),

    #[error("failed to build receipt")]
    Receipt(#[from] ReceiptError),

    #[error("failed to read cart")]
    Carts(#[from] CartsServiceError),

    #[error("failed to read wallet")]
    Wallets(#[from] WalletsServiceError),

    #[error("failed to record purchase")]
    Purchases(#[from] PurchasesServiceError),
}

impl From<CartError> for CheckoutError {
    fn from(error: CartError) -> Self {
        match error {
            CartError::Empty => Self::EmptyCart,
            other => Self::Pricing(PricingError::Cart(other)),
        }
    }
}

impl From<sqlx::Error> for CheckoutError {
    fn from(error: sqlx::Error) -> Self {
        Self::Purchases(error.into())
    }
}

impl CheckoutError {
    /// Gateway failures discard the checkout session.
    #[must_use]
    pub fn discards_session(&self) -> bool {
        matches!(
            self,
            Self::Declined(_) | Self::CaptureFailed(_) | Self::QrFailed(_) | Self::Gateway(_)
        )
    }
}
