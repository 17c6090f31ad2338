//! Bounded exponential backoff for gateway calls.

use std::{
    future::Future,
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use backoff::{ExponentialBackoff, future::retry};
use tracing::warn;

use crate::gateways::GatewayError;

/// How hard to retry a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub max_elapsed: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(200),
            max_interval: Duration::from_secs(2),
            max_elapsed: Duration::from_secs(10),
            max_attempts: 4,
        }
    }
}

impl RetryPolicy {
    /// A single attempt.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_interval,
            current_interval: self.initial_interval,
            max_interval: self.max_interval,
            max_elapsed_time: Some(self.max_elapsed),
            ..Default::default()
        }
    }

    /// Run `operation`, retrying while `is_transient` holds and attempts remain.
    pub async fn run<T, E, F, Fut>(
        &self,
        name: &'static str,
        is_transient: impl Fn(&E) -> bool,
        mut operation: F,
    ) -> Result<T, E>
    where
        E: std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempts = AtomicU32::new(0);
        let is_transient = &is_transient;
        let max_attempts = self.max_attempts;

        retry(self.backoff(), || {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            let call = operation();

            async move {
                call.await.map_err(|error| {
                    if attempt < max_attempts && is_transient(&error) {
                        warn!(operation = name, attempt, %error, "retrying after transient failure");

                        backoff::Error::transient(error)
                    } else {
                        backoff::Error::permanent(error)
                    }
                })
            }
        })
        .await
    }

    /// Retry a gateway call on transport errors and 5xx responses.
    pub async fn gateway<T, F, Fut>(&self, name: &'static str, operation: F) -> Result<T, GatewayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        self.run(name, GatewayError::is_transient, operation).await
    }
}
