//! Payment Gateways
//!
//! Clients for the external gateways that collect whatever internal instruments do not cover.

use async_trait::async_trait;
use mockall::automock;
use rusty_money::{Money, iso::Currency};

pub mod errors;
pub mod nets;
pub mod paypal;
pub mod retry;

pub use errors::GatewayError;
pub use nets::{NetsClient, NetsConfig};
pub use paypal::{PayPalClient, PayPalConfig};
pub use retry::RetryPolicy;

/// An order created with a redirect gateway, awaiting customer approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectOrder {
    pub order_id: String,
    pub approve_url: Option<String>,
}

/// Result of capturing an approved redirect order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Completed,

    /// Any other status reported by the gateway.
    NotCompleted(String),
}

/// A QR code issued for payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrCode {
    pub txn_retrieval_ref: String,

    /// Base64 encoded PNG
    pub qr_code: String,
}

/// Payment status of an issued QR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrStatus {
    Pending,
    Paid,
    Failed,
}

/// Redirect-and-capture gateway (PayPal).
#[automock]
#[async_trait]
pub trait RedirectGateway: Send + Sync {
    /// Create an order for `amount`, to be approved by the customer out-of-band.
    async fn create_order(
        &self,
        amount: Money<'static, Currency>,
    ) -> Result<RedirectOrder, GatewayError>;

    /// Capture an approved order.
    async fn capture_order(&self, order_id: &str) -> Result<CaptureOutcome, GatewayError>;
}

/// Scan-to-pay gateway (NETS QR).
#[automock]
#[async_trait]
pub trait QrGateway: Send + Sync {
    /// Issue a QR code for `amount`.
    async fn request_qr(&self, amount: Money<'static, Currency>) -> Result<QrCode, GatewayError>;

    /// Current payment status of an issued code.
    async fn query_status(&self, txn_retrieval_ref: &str) -> Result<QrStatus, GatewayError>;
}
