//! Checkout Sessions
//!
//! One in-flight checkout per user, held in memory between the pricing snapshot and
//! settlement.

use std::{sync::Arc, time::Duration};

use dashmap::{DashMap, mapref::entry::Entry};
use rusty_money::{Money, iso::Currency};
use storefront::{
    allocation::{Allocation, UsageRequest},
    cart::CartLine,
    pricing::OrderPricing,
};
use tokio::{task::JoinHandle, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    checkout::{errors::CheckoutError, flow::PaymentFlow},
    domain::{users::records::UserUuid, vouchers::records::VoucherClaimUuid},
    uuids::TypedUuid,
};

/// Sessions expire this long after they were last priced.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Checkout Session UUID
pub type CheckoutSessionUuid = TypedUuid<CheckoutSession>;

/// A voucher claim applied to the checkout, with the discount it realised.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedVoucher {
    pub claim: VoucherClaimUuid,
    pub code: String,
    pub discount: Money<'static, Currency>,
}

/// Pricing snapshot and payment state for one user's checkout.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub uuid: CheckoutSessionUuid,
    pub user: UserUuid,
    pub lines: Vec<CartLine<'static>>,
    pub pricing: OrderPricing<'static>,
    pub usage: UsageRequest<'static>,
    pub allocation: Allocation<'static>,
    pub voucher: Option<AppliedVoucher>,
    pub flow: Option<PaymentFlow>,
    /// When the current QR code was issued; its payment window runs from here.
    pub qr_issued_at: Option<Instant>,
    settling: bool,
    expires_at: Instant,
}

impl CheckoutSession {
    #[must_use]
    pub fn new(
        user: UserUuid,
        lines: Vec<CartLine<'static>>,
        pricing: OrderPricing<'static>,
        usage: UsageRequest<'static>,
        allocation: Allocation<'static>,
    ) -> Self {
        Self {
            uuid: CheckoutSessionUuid::new(),
            user,
            lines,
            pricing,
            usage,
            allocation,
            voucher: None,
            flow: None,
            qr_issued_at: None,
            settling: false,
            expires_at: Instant::now(),
        }
    }

    /// Whether a settlement attempt currently holds the session.
    #[must_use]
    pub fn is_settling(&self) -> bool {
        self.settling
    }

    /// Audit suffix for the purchase's payment details.
    #[must_use]
    pub fn describe_funding(&self) -> String {
        self.allocation.describe(
            self.voucher
                .as_ref()
                .map(|voucher| (voucher.code.as_str(), &voucher.discount)),
        )
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory store of checkout sessions keyed by user.
#[derive(Debug, Clone)]
pub struct CheckoutSessions {
    sessions: Arc<DashMap<UserUuid, CheckoutSession>>,
    ttl: Duration,
}

impl Default for CheckoutSessions {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl CheckoutSessions {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Start a checkout, replacing any idle session the user already had.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InProgress`] while the existing session is settling, and
    /// [`CheckoutError::PaymentPending`] while it holds a gateway order or QR code. Either way
    /// the existing session must be abandoned or left to expire first.
    pub fn start(&self, mut session: CheckoutSession) -> Result<CheckoutSession, CheckoutError> {
        let now = Instant::now();

        session.expires_at = now + self.ttl;
        session.settling = false;

        match self.sessions.entry(session.user) {
            Entry::Occupied(mut existing) => {
                let current = existing.get();

                if !current.is_expired(now) {
                    if current.settling {
                        return Err(CheckoutError::InProgress);
                    }

                    if current.flow.is_some() {
                        return Err(CheckoutError::PaymentPending);
                    }
                }

                existing.insert(session.clone());
            }
            Entry::Vacant(vacant) => {
                vacant.insert(session.clone());
            }
        }

        Ok(session)
    }

    /// The user's live session.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NoSession`] if there is none or it expired.
    pub fn get(&self, user: UserUuid) -> Result<CheckoutSession, CheckoutError> {
        self.update(user, |session| Ok(session.clone()))
    }

    /// Modify an idle session in place, refreshing its expiry.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NoSession`] if there is none, [`CheckoutError::InProgress`] if
    /// it is settling, or whatever `change` returns.
    pub fn update<T>(
        &self,
        user: UserUuid,
        change: impl FnOnce(&mut CheckoutSession) -> Result<T, CheckoutError>,
    ) -> Result<T, CheckoutError> {
        let now = Instant::now();

        let Entry::Occupied(mut entry) = self.sessions.entry(user) else {
            return Err(CheckoutError::NoSession);
        };

        if entry.get().is_expired(now) {
            entry.remove();

            debug!(user_uuid = %user, "checkout session expired");

            return Err(CheckoutError::NoSession);
        }

        let session = entry.get_mut();

        if session.settling {
            return Err(CheckoutError::InProgress);
        }

        let value = change(session)?;

        session.expires_at = now + self.ttl;

        Ok(value)
    }

    /// Claim the session for settlement. Only one caller can hold it at a time.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NoSession`] or [`CheckoutError::InProgress`].
    pub fn begin_settling(&self, user: UserUuid) -> Result<CheckoutSession, CheckoutError> {
        self.update(user, |session| {
            session.settling = true;

            Ok(session.clone())
        })
    }

    /// Return a session to idle after a settlement attempt that can be retried.
    pub fn release(&self, user: UserUuid) {
        self.release_with(user, |_| {});
    }

    /// Return a session to idle, keeping what the attempt learned (e.g. a gateway order).
    pub fn release_with(&self, user: UserUuid, change: impl FnOnce(&mut CheckoutSession)) {
        if let Some(mut session) = self.sessions.get_mut(&user) {
            change(session.value_mut());

            session.settling = false;
            session.expires_at = Instant::now() + self.ttl;
        }
    }

    /// Drop the user's session. Returns whether one existed.
    pub fn remove(&self, user: UserUuid) -> bool {
        self.sessions.remove(&user).is_some()
    }

    /// Drop the session only if it is still the one identified by `uuid`.
    pub fn remove_if(&self, user: UserUuid, uuid: CheckoutSessionUuid) -> bool {
        self.sessions
            .remove_if(&user, |_, session| session.uuid == uuid)
            .is_some()
    }

    /// Drop every expired session, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();

        self.sessions.retain(|_, session| !session.is_expired(now));

        before.saturating_sub(self.sessions.len())
    }

    /// Purge expired sessions every `every` until `shutdown` fires.
    #[must_use]
    pub fn spawn_sweeper(&self, every: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        let sessions = self.clone();

        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(every);

            loop {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    _ = ticks.tick() => {
                        let purged = sessions.purge_expired();

                        if purged > 0 {
                            debug!(purged, "expired checkout sessions purged");
                        }
                    }
                }
            }
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
