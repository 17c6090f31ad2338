//! Payment Flows

use storefront::allocation::PaymentMethod;

use crate::checkout::session::CheckoutSessionUuid;

/// How the in-flight checkout is being paid. Every flow converges on settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentFlow {
    /// Card details validated and settled immediately.
    Card,

    /// Store credit and e-wallet cover the whole order.
    Internal,

    /// Customer approves a gateway order out-of-band, then it is captured.
    Redirect { order_id: String },

    /// Customer scans a QR code; settlement follows a paid status poll.
    Qr { txn_retrieval_ref: String },
}

impl PaymentFlow {
    /// Method recorded on the purchase before internal funding is considered.
    #[must_use]
    pub fn method(&self) -> PaymentMethod {
        match self {
            Self::Card => PaymentMethod::Card,
            Self::Internal => PaymentMethod::StoreCreditAndWallet,
            Self::Redirect { .. } => PaymentMethod::PayPal,
            Self::Qr { .. } => PaymentMethod::NetsQr,
        }
    }

    /// Unique reference a settlement is recorded under.
    #[must_use]
    pub fn gateway_reference(&self, session: CheckoutSessionUuid) -> String {
        match self {
            Self::Card => format!("card:{session}"),
            Self::Internal => format!("internal:{session}"),
            Self::Redirect { order_id } => format!("paypal:{order_id}"),
            Self::Qr { txn_retrieval_ref } => format!("nets:{txn_retrieval_ref}"),
        }
    }
}
