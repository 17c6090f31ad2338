//! Checkout Config

use std::time::Duration;

use clap::Args;
use storefront_app::checkout::{CheckoutSettings, qr::QrWatchSettings};

/// Checkout session lifetime and QR watch timing.
#[derive(Debug, Args)]
pub struct CheckoutConfig {
    /// Idle checkout sessions expire after this many seconds
    #[arg(long, env = "CHECKOUT_SESSION_TTL_SECONDS", default_value_t = 1_800_u64)]
    pub checkout_session_ttl_seconds: u64,

    /// Seconds between QR payment status polls
    #[arg(long, env = "QR_POLL_INTERVAL_SECONDS", default_value_t = 3_u64)]
    pub qr_poll_interval_seconds: u64,

    /// Seconds before an unpaid QR code is abandoned
    #[arg(long, env = "QR_TIMEOUT_SECONDS", default_value_t = 300_u64)]
    pub qr_timeout_seconds: u64,

    /// Seconds between heartbeats on the QR event stream
    #[arg(long, env = "QR_HEARTBEAT_SECONDS", default_value_t = 25_u64)]
    pub qr_heartbeat_seconds: u64,
}

impl CheckoutConfig {
    /// Checkout settings handed to the application context.
    #[must_use]
    pub fn settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            session_ttl: Duration::from_secs(self.checkout_session_ttl_seconds),
            qr: QrWatchSettings {
                poll_interval: Duration::from_secs(self.qr_poll_interval_seconds.max(1)),
                timeout: Duration::from_secs(self.qr_timeout_seconds),
                heartbeat: Duration::from_secs(self.qr_heartbeat_seconds.max(1)),
            },
        }
    }
}
