//! Gateway Config

use std::time::Duration;

use clap::Args;
use storefront_app::{
    context,
    gateways::{NetsConfig, PayPalConfig, RetryPolicy},
};
use zeroize::Zeroizing;

/// `PayPal` and NETS credentials.
#[derive(Debug, Args)]
pub struct GatewaysConfig {
    /// `PayPal` REST API base URL
    #[arg(long, env = "PAYPAL_API", default_value = "https://api-m.sandbox.paypal.com")]
    pub paypal_api: String,

    /// `PayPal` client id
    #[arg(long, env = "PAYPAL_CLIENT_ID")]
    pub paypal_client_id: String,

    /// `PayPal` client secret
    #[arg(long, env = "PAYPAL_CLIENT_SECRET", hide_env_values = true)]
    pub paypal_client_secret: Zeroizing<String>,

    /// NETS QR API base URL
    #[arg(
        long,
        env = "NETS_BASE_URL",
        default_value = "https://sandbox.nets.openapipaas.com"
    )]
    pub nets_base_url: String,

    /// NETS API key
    #[arg(long, env = "NETS_API_KEY", hide_env_values = true)]
    pub nets_api_key: Zeroizing<String>,

    /// NETS project id
    #[arg(long, env = "NETS_PROJECT_ID")]
    pub nets_project_id: String,

    /// Merchant transaction id sent with each QR request
    #[arg(
        long,
        env = "NETS_TXN_ID",
        default_value = "sandbox_nets|m|8ff8e5b6-d43e-4786-8ac5-7accf8c5bd9b"
    )]
    pub nets_txn_id: String,

    /// Attempts per gateway call, including the first
    #[arg(long, env = "GATEWAY_RETRY_ATTEMPTS", default_value_t = 4_u32)]
    pub gateway_retry_attempts: u32,

    /// Give up retrying a gateway call after this many milliseconds
    #[arg(long, env = "GATEWAY_RETRY_MAX_ELAPSED_MS", default_value_t = 10_000_u64)]
    pub gateway_retry_max_elapsed_ms: u64,
}

impl GatewaysConfig {
    /// Gateway settings handed to the application context.
    #[must_use]
    pub fn to_app_config(&self) -> context::GatewaysConfig {
        context::GatewaysConfig {
            paypal: PayPalConfig {
                api: self.paypal_api.clone(),
                client_id: self.paypal_client_id.clone(),
                client_secret: self.paypal_client_secret.clone(),
            },
            nets: NetsConfig {
                base_url: self.nets_base_url.clone(),
                api_key: self.nets_api_key.clone(),
                project_id: self.nets_project_id.clone(),
                txn_id: self.nets_txn_id.clone(),
            },
            retry: RetryPolicy {
                max_attempts: self.gateway_retry_attempts.max(1),
                max_elapsed: Duration::from_millis(self.gateway_retry_max_elapsed_ms),
                ..RetryPolicy::default()
            },
        }
    }
}
