//! QR Payment Watcher
//!
//! Polls an issued QR code until it is paid, fails, or times out, streaming progress to the
//! customer. The payment window runs from when the code was issued, so reconnecting does not
//! extend it. Settlement succeeds at most once per watcher.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use tokio::{
    sync::mpsc,
    time::{Instant, MissedTickBehavior, interval_at, sleep_until},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    checkout::errors::CheckoutError,
    domain::purchases::records::PurchaseUuid,
    gateways::{QrGateway, QrStatus},
};

const EVENT_BUFFER: usize = 8;

/// Timing of a QR watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrWatchSettings {
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub heartbeat: Duration,
}

impl Default for QrWatchSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(300),
            heartbeat: Duration::from_secs(25),
        }
    }
}

/// Progress of a QR payment, as sent to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QrEvent {
    Heartbeat,
    Success { purchase: PurchaseUuid },
    Fail { reason: String },
}

impl QrEvent {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Heartbeat)
    }
}

/// What the watcher does once the code is paid, or when it gives up.
#[automock]
#[async_trait]
pub trait QrSettlement: Send + Sync {
    /// Record the purchase.
    async fn settle(&self) -> Result<PurchaseUuid, CheckoutError>;

    /// Drop the checkout after a failed or expired payment.
    fn discard(&self);
}

/// Watch `txn_retrieval_ref`, issued at `issued_at`, in the background. Dropping the receiver
/// or cancelling `cancel` stops polling.
///
/// Once the code is paid the deadline no longer applies; a settlement that finds the checkout
/// busy is retried on the next poll.
pub fn watch_qr(
    gateway: Arc<dyn QrGateway>,
    txn_retrieval_ref: String,
    issued_at: Instant,
    settings: QrWatchSettings,
    cancel: CancellationToken,
    settlement: Arc<dyn QrSettlement>,
) -> mpsc::Receiver<QrEvent> {
    let (events, receiver) = mpsc::channel(EVENT_BUFFER);

    tokio::spawn(async move {
        let started = Instant::now();
        let deadline = sleep_until(issued_at + settings.timeout);
        tokio::pin!(deadline);

        let mut paid = false;

        let mut heartbeat = interval_at(started + settings.heartbeat, settings.heartbeat);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut poll = interval_at(started + settings.poll_interval, settings.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let terminal = loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    debug!(%txn_retrieval_ref, "qr watch cancelled");

                    break None;
                }
                () = events.closed() => {
                    debug!(%txn_retrieval_ref, "qr watch receiver dropped");

                    break None;
                }
                () = &mut deadline, if !paid => {
                    info!(%txn_retrieval_ref, "qr payment timed out");

                    settlement.discard();

                    break Some(QrEvent::Fail { reason: "timeout".to_string() });
                }
                _ = heartbeat.tick() => {
                    if events.send(QrEvent::Heartbeat).await.is_err() {
                        break None;
                    }
                }
                _ = poll.tick() => {
                    match gateway.query_status(&txn_retrieval_ref).await {
                        Ok(QrStatus::Pending) => {}
                        Ok(QrStatus::Paid) => {
                            paid = true;

                            match settlement.settle().await {
                                Ok(purchase) => break Some(QrEvent::Success { purchase }),
                                Err(CheckoutError::InProgress) => {
                                    debug!(
                                        %txn_retrieval_ref,
                                        "checkout busy; settling on next poll"
                                    );
                                }
                                Err(error) => {
                                    break Some(QrEvent::Fail { reason: error.to_string() });
                                }
                            }
                        }
                        Ok(QrStatus::Failed) => {
                            info!(%txn_retrieval_ref, "qr payment failed");

                            settlement.discard();

                            break Some(QrEvent::Fail { reason: "failed".to_string() });
                        }
                        Err(error) => {
                            warn!(%txn_retrieval_ref, error = %error, "qr status query failed");
                        }
                    }
                }
            }
        };

        if let Some(event) = terminal {
            let _sent = events.send(event).await;
        }
    });

    receiver
}
