//! Settlement
//!
//! The single write path into the purchase ledger.

use sqlx::{Postgres, Transaction};
use storefront::{
    money::sgd,
    receipt::{Receipt, ReceiptError},
    vouchers::{VoucherError, VoucherRejection},
};
use tracing::{Span, error, info, warn};

use crate::{
    checkout::{
        errors::CheckoutError,
        flow::PaymentFlow,
        session::CheckoutSession,
        tasks::{SettlementTask, TaskQueue},
    },
    database::Db,
    domain::{
        purchases::{
            PgPurchasesRepository, PurchasesServiceError, data::NewPurchase,
            records::PurchaseRecord,
        },
        vouchers::PgVouchersRepository,
        wallets::{data::FundsMovement, ledger::WalletLedger, records::WalletInstrument},
    },
};

/// Partial unique index allowing each voucher claim on one purchase only.
const VOUCHER_CLAIM_CONSTRAINT: &str = "purchases_voucher_claim_uniq";

/// A recorded purchase. `replayed` is set when the gateway reference had already been settled,
/// in which case no side effects ran.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub purchase: PurchaseRecord,
    pub replayed: bool,
}

/// Records purchases together with their wallet deductions and voucher consumption, then hands
/// the remaining side effects to the task queue.
#[derive(Debug, Clone)]
pub struct Settler {
    db: Db,
    purchases: PgPurchasesRepository,
    vouchers: PgVouchersRepository,
    wallet: WalletLedger,
    tasks: TaskQueue,
}

impl Settler {
    #[must_use]
    pub fn new(db: Db, tasks: TaskQueue) -> Self {
        Self {
            db,
            purchases: PgPurchasesRepository::new(),
            vouchers: PgVouchersRepository::new(),
            wallet: WalletLedger::new(),
            tasks,
        }
    }

    #[must_use]
    pub fn tasks(&self) -> &TaskQueue {
        &self.tasks
    }

    /// Commit the session's purchase under the flow's gateway reference.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the receipt does not balance, the voucher claim was
    /// already used, a wallet instrument no longer covers its share, or the purchase cannot be
    /// stored. Nothing is written in that case.
    #[tracing::instrument(
        name = "checkout.settle",
        skip(self, session, flow_details),
        fields(
            user_uuid = %session.user,
            checkout_session_uuid = %session.uuid,
            gateway_reference = tracing::field::Empty,
            purchase_uuid = tracing::field::Empty,
        ),
        err
    )]
    pub async fn settle(
        &self,
        session: &CheckoutSession,
        flow: &PaymentFlow,
        flow_details: Option<String>,
    ) -> Result<Settlement, CheckoutError> {
        let gateway_reference = flow.gateway_reference(session.uuid);

        Span::current().record(
            "gateway_reference",
            tracing::field::display(&gateway_reference),
        );

        let receipt = Receipt::new(
            session.lines.iter().cloned(),
            session.pricing,
            session.allocation,
            flow.method(),
        )?;

        let payment_details = flow_details
            .into_iter()
            .chain(Some(session.describe_funding()).filter(|funding| !funding.is_empty()))
            .collect::<Vec<_>>()
            .join(" | ");

        let purchase = NewPurchase::from_receipt(
            session.user,
            &receipt,
            payment_details,
            gateway_reference,
            session
                .voucher
                .as_ref()
                .filter(|voucher| voucher.discount.to_minor_units() > 0)
                .map(|voucher| voucher.claim),
        )?;

        let lines_total = purchase.lines_total().map_err(ReceiptError::from)?;

        if lines_total != purchase.subtotal {
            return Err(ReceiptError::Unbalanced {
                lines: lines_total,
                subtotal: purchase.subtotal,
            }
            .into());
        }

        let mut tx = self.db.begin().await?;

        let (record, replayed) = match self.purchases.record_purchase(&mut tx, &purchase).await {
            Ok(recorded) => recorded,
            Err(sqlx::Error::Database(db)) if db.constraint() == Some(VOUCHER_CLAIM_CONSTRAINT) => {
                return Err(refuse(flow, &purchase.gateway_reference, voucher_used()));
            }
            Err(other) => return Err(PurchasesServiceError::from(other).into()),
        };

        if !replayed && let Err(error) = self.apply_funding(&mut tx, &record).await {
            return Err(refuse(flow, &record.gateway_reference, error));
        }

        tx.commit().await?;

        Span::current().record("purchase_uuid", tracing::field::display(record.uuid));

        if replayed {
            warn!(
                purchase_uuid = %record.uuid,
                gateway_reference = %record.gateway_reference,
                "settlement replayed; returning existing purchase"
            );

            return Ok(Settlement {
                purchase: record,
                replayed,
            });
        }

        info!(
            purchase_uuid = %record.uuid,
            total = record.total,
            payment_method = record.payment_method.as_str(),
            "purchase settled"
        );

        self.tasks.enqueue(SettlementTask::for_purchase(&record)).await;

        Ok(Settlement {
            purchase: record,
            replayed,
        })
    }

    /// Consume the voucher claim and take each wallet instrument's share, all or nothing.
    async fn apply_funding(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: &PurchaseRecord,
    ) -> Result<(), CheckoutError> {
        if let Some(claim) = record.voucher_claim
            && !self
                .vouchers
                .mark_claim_used(tx, claim, record.uuid.into_uuid())
                .await?
        {
            return Err(voucher_used());
        }

        let shares = [
            (WalletInstrument::StoreCredit, record.store_credit_used),
            (WalletInstrument::EWallet, record.e_wallet_used),
        ];

        for (instrument, amount) in shares.into_iter().filter(|(_, amount)| *amount > 0) {
            let movement = FundsMovement {
                amount: sgd(amount),
                instrument,
                payment_method: None,
                description: format!("Payment for purchase {}", record.uuid),
                reference: record.uuid.to_string(),
            };

            self.wallet.withdraw(tx, record.user, &movement).await?;
        }

        Ok(())
    }
}

/// Gateway flows have already taken the customer's money by the time settlement is refused.
fn refuse(flow: &PaymentFlow, gateway_reference: &str, reason: CheckoutError) -> CheckoutError {
    if !matches!(flow, PaymentFlow::Internal) {
        error!(
            gateway_reference,
            error = %reason,
            "payment captured but settlement refused; refund required"
        );
    }

    reason
}

fn voucher_used() -> CheckoutError {
    VoucherError::Rejected(VoucherRejection::AlreadyUsed).into()
}
