//! Checkout service.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use jiff::{Timestamp, Zoned};
use mockall::automock;
use storefront::{
    allocation::{Allocation, AvailableBalances, UsageRequest, allocate},
    cards::CardDetails,
    money::{sgd, to_decimal_string},
    pricing::OrderPricing,
    vouchers::checkout_discount,
};
use tokio::{sync::mpsc, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{Span, info, warn};

use crate::{
    checkout::{
        errors::CheckoutError,
        flow::PaymentFlow,
        qr::{self, QrEvent, QrSettlement, QrWatchSettings},
        session::{AppliedVoucher, CheckoutSession, CheckoutSessions, DEFAULT_SESSION_TTL},
        settlement::{Settlement, Settler},
    },
    domain::{
        carts::{CartsService, records::to_cart},
        purchases::records::PurchaseUuid,
        users::records::UserUuid,
        vouchers::VouchersService,
        wallets::WalletsService,
    },
    gateways::{CaptureOutcome, GatewayError, QrCode, QrGateway, RedirectGateway, RedirectOrder},
};

/// Checkout timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSettings {
    pub session_ttl: Duration,
    pub qr: QrWatchSettings,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            session_ttl: DEFAULT_SESSION_TTL,
            qr: QrWatchSettings::default(),
        }
    }
}

#[derive(Clone)]
pub struct PgCheckoutService {
    sessions: CheckoutSessions,
    carts: Arc<dyn CartsService>,
    wallets: Arc<dyn WalletsService>,
    vouchers: Arc<dyn VouchersService>,
    redirect: Arc<dyn RedirectGateway>,
    qr: Arc<dyn QrGateway>,
    settler: Settler,
    settings: CheckoutSettings,
}

impl PgCheckoutService {
    #[must_use]
    pub fn new(
        settler: Settler,
        carts: Arc<dyn CartsService>,
        wallets: Arc<dyn WalletsService>,
        vouchers: Arc<dyn VouchersService>,
        redirect: Arc<dyn RedirectGateway>,
        qr: Arc<dyn QrGateway>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            sessions: CheckoutSessions::new(settings.session_ttl),
            carts,
            wallets,
            vouchers,
            redirect,
            qr,
            settler,
            settings,
        }
    }

    #[must_use]
    pub fn sessions(&self) -> &CheckoutSessions {
        &self.sessions
    }

    /// Split `pricing` across the requested instruments using live balances.
    async fn allocate(
        &self,
        user: UserUuid,
        pricing: &OrderPricing<'static>,
        usage: &UsageRequest<'static>,
    ) -> Result<Allocation<'static>, CheckoutError> {
        let wallet = self.wallets.get_wallet(user).await?;

        let balances = AvailableBalances {
            store_credit: sgd(wallet.store_credit),
            e_wallet: sgd(wallet.e_wallet_balance),
        };

        Ok(allocate(pricing.base_total()?, usage, &balances)?)
    }

    /// Reprice the session with a new voucher, dropping any gateway order made for the old
    /// amount.
    async fn reprice(
        &self,
        user: UserUuid,
        voucher: Option<AppliedVoucher>,
    ) -> Result<CheckoutSession, CheckoutError> {
        let session = self.sessions.get(user)?;

        let pricing = match &voucher {
            Some(applied) => session.pricing.with_voucher_discount(applied.discount),
            None => session.pricing.without_voucher(),
        };

        let allocation = self.allocate(user, &pricing, &session.usage).await?;

        self.sessions.update(user, |current| {
            if current.uuid != session.uuid {
                return Err(CheckoutError::FlowMismatch);
            }

            if matches!(current.flow, Some(PaymentFlow::Qr { .. })) {
                return Err(CheckoutError::PaymentPending);
            }

            current.pricing = pricing;
            current.allocation = allocation;
            current.voucher = voucher;
            current.flow = None;
            current.qr_issued_at = None;

            Ok(current.clone())
        })
    }

    /// Settle a claimed session, refreshing the allocation unless a gateway order froze it.
    async fn settle_now(
        &self,
        mut session: CheckoutSession,
        flow: &PaymentFlow,
        details: Option<String>,
    ) -> Result<Settlement, CheckoutError> {
        if matches!(flow, PaymentFlow::Card | PaymentFlow::Internal) {
            session.allocation = self
                .allocate(session.user, &session.pricing, &session.usage)
                .await?;
        }

        if *flow == PaymentFlow::Internal && !session.allocation.is_internally_funded() {
            return Err(CheckoutError::GatewayRequired {
                remaining: to_decimal_string(&session.allocation.remaining_for_gateway),
            });
        }

        self.settler.settle(&session, flow, details).await
    }

    /// Conclude a settlement attempt: success and gateway failures end the session, anything
    /// else hands it back to the customer.
    fn conclude<T>(
        &self,
        session: &CheckoutSession,
        result: Result<T, CheckoutError>,
    ) -> Result<T, CheckoutError> {
        match &result {
            Ok(_) => {
                self.sessions.remove_if(session.user, session.uuid);
            }
            Err(error) if error.discards_session() => {
                warn!(
                    user_uuid = %session.user,
                    checkout_session_uuid = %session.uuid,
                    error = %error,
                    "checkout discarded after gateway failure"
                );

                self.sessions.remove_if(session.user, session.uuid);
            }
            Err(_) => self.sessions.release(session.user),
        }

        result
    }

    /// Claim the session and work out what the gateway must collect.
    async fn gateway_amount(
        &self,
        user: UserUuid,
    ) -> Result<(CheckoutSession, Allocation<'static>), CheckoutError> {
        let session = self.sessions.begin_settling(user)?;

        let allocation = match self
            .allocate(user, &session.pricing, &session.usage)
            .await
        {
            Ok(allocation) if allocation.is_internally_funded() => {
                Err(CheckoutError::NothingToCharge)
            }
            other => other,
        };

        match allocation {
            Ok(allocation) => Ok((session, allocation)),
            Err(error) => {
                self.sessions.release(user);

                Err(error)
            }
        }
    }
}

#[async_trait]
impl CheckoutService for PgCheckoutService {
    #[tracing::instrument(
        name = "checkout.service.begin",
        skip(self, usage),
        fields(user_uuid = %user, checkout_session_uuid = tracing::field::Empty),
        err
    )]
    async fn begin(
        &self,
        user: UserUuid,
        usage: UsageRequest<'static>,
    ) -> Result<CheckoutSession, CheckoutError> {
        let items = self.carts.list_items(user).await?;

        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let cart = to_cart(&items)?;
        let pricing = OrderPricing::for_cart(&cart)?;
        let allocation = self.allocate(user, &pricing, &usage).await?;

        let session = self.sessions.start(CheckoutSession::new(
            user,
            cart.into_lines(),
            pricing,
            usage,
            allocation,
        ))?;

        Span::current().record(
            "checkout_session_uuid",
            tracing::field::display(session.uuid),
        );

        Ok(session)
    }

    #[tracing::instrument(
        name = "checkout.service.apply_voucher",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn apply_voucher(
        &self,
        user: UserUuid,
        code: String,
    ) -> Result<CheckoutSession, CheckoutError> {
        let session = self.sessions.get(user)?;
        let claim = self.vouchers.find_claim_by_code(user, code).await?;

        let discount = checkout_discount(
            &claim.voucher.terms(),
            session.pricing.pre_discount_total()?,
            Timestamp::now(),
        )?;

        let session = self
            .reprice(
                user,
                Some(AppliedVoucher {
                    claim: claim.uuid,
                    code: claim.voucher.code,
                    discount,
                }),
            )
            .await?;

        info!(
            checkout_session_uuid = %session.uuid,
            voucher_claim_uuid = %claim.uuid,
            discount = %to_decimal_string(&discount),
            "voucher applied"
        );

        Ok(session)
    }

    #[tracing::instrument(
        name = "checkout.service.clear_voucher",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn clear_voucher(&self, user: UserUuid) -> Result<CheckoutSession, CheckoutError> {
        self.reprice(user, None).await
    }

    #[tracing::instrument(
        name = "checkout.service.pay_by_card",
        skip(self, card),
        fields(user_uuid = %user),
        err
    )]
    async fn pay_by_card(
        &self,
        user: UserUuid,
        card: CardDetails,
    ) -> Result<Settlement, CheckoutError> {
        let session = self.sessions.begin_settling(user)?;

        let result = match card.validate(Zoned::now().date()) {
            Ok(validated) => {
                let details = format!("Card {}", validated.masked());

                self.settle_now(session.clone(), &PaymentFlow::Card, Some(details))
                    .await
            }
            Err(error) => Err(error.into()),
        };

        self.conclude(&session, result)
    }

    #[tracing::instrument(
        name = "checkout.service.complete_internally",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn complete_internally(&self, user: UserUuid) -> Result<Settlement, CheckoutError> {
        let session = self.sessions.begin_settling(user)?;

        let result = self
            .settle_now(session.clone(), &PaymentFlow::Internal, None)
            .await;

        self.conclude(&session, result)
    }

    #[tracing::instrument(
        name = "checkout.service.create_redirect_order",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn create_redirect_order(&self, user: UserUuid) -> Result<RedirectOrder, CheckoutError> {
        let (session, allocation) = self.gateway_amount(user).await?;

        match self
            .redirect
            .create_order(allocation.remaining_for_gateway)
            .await
        {
            Ok(order) => {
                let flow = PaymentFlow::Redirect {
                    order_id: order.order_id.clone(),
                };

                self.sessions.release_with(user, |current| {
                    current.allocation = allocation;
                    current.flow = Some(flow);
                });

                Ok(order)
            }
            Err(error) => self.conclude(&session, Err(error.into())),
        }
    }

    #[tracing::instrument(
        name = "checkout.service.capture_redirect_order",
        skip(self),
        fields(user_uuid = %user, order_id = %order_id),
        err
    )]
    async fn capture_redirect_order(
        &self,
        user: UserUuid,
        order_id: String,
    ) -> Result<Settlement, CheckoutError> {
        let session = self.sessions.begin_settling(user)?;

        let flow = PaymentFlow::Redirect {
            order_id: order_id.clone(),
        };

        if session.flow.as_ref() != Some(&flow) {
            self.sessions.release(user);

            return Err(CheckoutError::FlowMismatch);
        }

        let result = match self.redirect.capture_order(&order_id).await {
            Ok(CaptureOutcome::Completed) => {
                let details = format!("PayPal order {order_id}");

                self.settle_now(session.clone(), &flow, Some(details)).await
            }
            Ok(CaptureOutcome::NotCompleted(status)) => Err(CheckoutError::CaptureFailed(status)),
            Err(error) => Err(error.into()),
        };

        self.conclude(&session, result)
    }

    #[tracing::instrument(
        name = "checkout.service.request_qr",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn request_qr(&self, user: UserUuid) -> Result<QrCode, CheckoutError> {
        let (session, allocation) = self.gateway_amount(user).await?;

        match self.qr.request_qr(allocation.remaining_for_gateway).await {
            Ok(code) => {
                let flow = PaymentFlow::Qr {
                    txn_retrieval_ref: code.txn_retrieval_ref.clone(),
                };

                self.sessions.release_with(user, |current| {
                    current.allocation = allocation;
                    current.flow = Some(flow);
                    current.qr_issued_at = Some(Instant::now());
                });

                Ok(code)
            }
            Err(GatewayError::Declined(reason)) => {
                self.conclude(&session, Err(CheckoutError::QrFailed(reason)))
            }
            Err(error) => self.conclude(&session, Err(error.into())),
        }
    }

    fn watch_qr(
        &self,
        user: UserUuid,
        txn_retrieval_ref: String,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<QrEvent>, CheckoutError> {
        let session = self.sessions.get(user)?;

        let flow = PaymentFlow::Qr {
            txn_retrieval_ref: txn_retrieval_ref.clone(),
        };

        if session.flow.as_ref() != Some(&flow) {
            return Err(CheckoutError::FlowMismatch);
        }

        let issued_at = session.qr_issued_at.unwrap_or_else(Instant::now);

        let settlement = Arc::new(SessionQrSettlement {
            service: self.clone(),
            session,
            flow,
        });

        Ok(qr::watch_qr(
            Arc::clone(&self.qr),
            txn_retrieval_ref,
            issued_at,
            self.settings.qr,
            cancel,
            settlement,
        ))
    }

    fn abandon(&self, user: UserUuid) -> bool {
        let removed = self.sessions.remove(user);

        if removed {
            info!(user_uuid = %user, "checkout abandoned");
        }

        removed
    }
}

/// Settles the watched QR payment against the session that requested it.
struct SessionQrSettlement {
    service: PgCheckoutService,
    session: CheckoutSession,
    flow: PaymentFlow,
}

#[async_trait]
impl QrSettlement for SessionQrSettlement {
    async fn settle(&self) -> Result<PurchaseUuid, CheckoutError> {
        let session = self.service.sessions.begin_settling(self.session.user)?;

        if session.uuid != self.session.uuid || session.flow.as_ref() != Some(&self.flow) {
            self.service.sessions.release(session.user);

            return Err(CheckoutError::FlowMismatch);
        }

        let details = match &self.flow {
            PaymentFlow::Qr { txn_retrieval_ref } => Some(format!("NETS QR {txn_retrieval_ref}")),
            _ => None,
        };

        let result = self
            .service
            .settle_now(session.clone(), &self.flow, details)
            .await;

        self.service
            .conclude(&session, result)
            .map(|settlement| settlement.purchase.uuid)
    }

    fn discard(&self) {
        self.service
            .sessions
            .remove_if(self.session.user, self.session.uuid);
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Snapshot the cart's pricing and allocate it across the requested instruments.
    async fn begin(
        &self,
        user: UserUuid,
        usage: UsageRequest<'static>,
    ) -> Result<CheckoutSession, CheckoutError>;

    /// Apply a claimed voucher by code.
    async fn apply_voucher(
        &self,
        user: UserUuid,
        code: String,
    ) -> Result<CheckoutSession, CheckoutError>;

    /// Remove the applied voucher, restoring the pre-voucher total.
    async fn clear_voucher(&self, user: UserUuid) -> Result<CheckoutSession, CheckoutError>;

    /// Validate card details and settle immediately.
    async fn pay_by_card(
        &self,
        user: UserUuid,
        card: CardDetails,
    ) -> Result<Settlement, CheckoutError>;

    /// Settle an order that store credit and e-wallet fully cover.
    async fn complete_internally(&self, user: UserUuid) -> Result<Settlement, CheckoutError>;

    /// Create a redirect gateway order for the amount internal instruments leave uncovered.
    async fn create_redirect_order(&self, user: UserUuid) -> Result<RedirectOrder, CheckoutError>;

    /// Capture an approved redirect order and settle.
    async fn capture_redirect_order(
        &self,
        user: UserUuid,
        order_id: String,
    ) -> Result<Settlement, CheckoutError>;

    /// Issue a QR code for the amount internal instruments leave uncovered.
    async fn request_qr(&self, user: UserUuid) -> Result<QrCode, CheckoutError>;

    /// Stream the payment status of an issued QR code, settling once it is paid.
    fn watch_qr(
        &self,
        user: UserUuid,
        txn_retrieval_ref: String,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<QrEvent>, CheckoutError>;

    /// Drop the user's checkout. Returns whether there was one.
    fn abandon(&self, user: UserUuid) -> bool;
}
