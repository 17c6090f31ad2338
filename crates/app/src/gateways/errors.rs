//! Gateway errors.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while talking to a payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-2xx status.
    #[error("gateway returned {status}: {body}")]
    Status {
        /// Response status
        status: StatusCode,

        /// Response body, for diagnostics
        body: String,
    },

    /// The gateway answered but the body was not what we expected.
    #[error("unexpected response from gateway: {0}")]
    UnexpectedResponse(String),

    /// The gateway declined the request.
    #[error("gateway declined: {0}")]
    Declined(String),
}

impl GatewayError {
    /// Transport failures and 5xx responses are worth retrying. Declines and 4xx are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(error) => error.is_timeout() || error.is_connect() || error.is_request(),
            Self::Status { status, .. } => status.is_server_error(),
            Self::UnexpectedResponse(_) | Self::Declined(_) => false,
        }
    }
}
