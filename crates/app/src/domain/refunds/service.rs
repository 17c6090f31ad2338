//! Refunds service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use storefront::{
    money::sgd,
    refunds::{RefundError, RefundStatus, ensure_approvable, ensure_can_request, ensure_pending},
};
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::{
        purchases::{PgPurchasesRepository, records::PurchaseUuid},
        refunds::{
            data::RefundDecision,
            errors::RefundsServiceError,
            records::{RefundRequestRecord, RefundRequestUuid},
            repository::{PgRefundsRepository, RefundOutcome},
        },
        users::records::UserUuid,
        wallets::{
            WalletsServiceError,
            data::FundsMovement,
            ledger::WalletLedger,
            records::{WalletInstrument, WalletTransactionKind},
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgRefundsService {
    db: Db,
    repository: PgRefundsRepository,
    purchases: PgPurchasesRepository,
    ledger: WalletLedger,
}

impl PgRefundsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgRefundsRepository::new(),
            purchases: PgPurchasesRepository::new(),
            ledger: WalletLedger::new(),
        }
    }

    /// Reload a request that the conditional update skipped to report why.
    async fn not_pending(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: RefundRequestUuid,
    ) -> RefundsServiceError {
        match self.repository.get_request(tx, request).await {
            Ok(current) => RefundError::AlreadyDecided(current.status).into(),
            Err(error) => error.into(),
        }
    }
}

#[async_trait]
impl RefundsService for PgRefundsService {
    #[tracing::instrument(
        name = "refunds.service.request_refund",
        skip(self, reason),
        fields(user_uuid = %user, purchase_uuid = %purchase, refund_request_uuid),
        err
    )]
    async fn request_refund(
        &self,
        user: UserUuid,
        purchase: PurchaseUuid,
        reason: String,
    ) -> Result<RefundRequestRecord, RefundsServiceError> {
        let mut tx = self.db.begin().await?;

        self.purchases
            .get_purchase(&mut tx, purchase, Some(user))
            .await?;

        let existing = self.repository.purchase_statuses(&mut tx, purchase).await?;

        ensure_can_request(existing, &reason)?;

        let request = self
            .repository
            .insert_request(&mut tx, purchase, user, reason.trim())
            .await?;

        tx.commit().await?;

        Span::current().record(
            "refund_request_uuid",
            tracing::field::display(request.uuid),
        );

        info!("refund requested");

        Ok(request)
    }

    async fn list_for_user(
        &self,
        user: UserUuid,
    ) -> Result<Vec<RefundRequestRecord>, RefundsServiceError> {
        let mut tx = self.db.begin().await?;

        let requests = self.repository.list_for_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(requests)
    }

    async fn list(
        &self,
        status: Option<RefundStatus>,
    ) -> Result<Vec<RefundRequestRecord>, RefundsServiceError> {
        let mut tx = self.db.begin().await?;

        let requests = self.repository.list(&mut tx, status).await?;

        tx.commit().await?;

        Ok(requests)
    }

    #[tracing::instrument(
        name = "refunds.service.approve",
        skip(self, decision),
        fields(refund_request_uuid = %request, amount = %decision.amount),
        err
    )]
    async fn approve(
        &self,
        request: RefundRequestUuid,
        decision: RefundDecision,
    ) -> Result<RefundRequestRecord, RefundsServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.repository.get_request(&mut tx, request).await?;

        ensure_pending(current.status)?;

        let purchase = self
            .purchases
            .get_purchase(&mut tx, current.purchase, None)
            .await?;

        let paid = purchase
            .total
            .checked_add(purchase.store_credit_used)
            .and_then(|paid| paid.checked_add(purchase.e_wallet_used))
            .ok_or(RefundsServiceError::InvalidData)?;

        ensure_approvable(&decision.amount, &sgd(paid))?;

        let outcome = RefundOutcome {
            status: RefundStatus::Approved,
            admin_notes: decision.admin_notes.as_deref(),
            refund_amount: Some(decision.amount.to_minor_units()),
        };

        let Some(approved) = self.repository.decide(&mut tx, request, outcome).await? else {
            return Err(self.not_pending(&mut tx, request).await);
        };

        let movement = FundsMovement {
            amount: decision.amount,
            instrument: WalletInstrument::StoreCredit,
            payment_method: None,
            description: format!("Refund for purchase {}", approved.purchase),
            reference: approved.credit_reference(),
        };

        self.ledger
            .credit(
                &mut tx,
                approved.user,
                &movement,
                WalletTransactionKind::Refund,
            )
            .await
            .map_err(|error| match error {
                WalletsServiceError::AlreadyExists => {
                    RefundsServiceError::Refund(RefundError::AlreadyDecided(RefundStatus::Approved))
                }
                other => other.into(),
            })?;

        tx.commit().await?;

        info!(user_uuid = %approved.user, "refund approved and credited");

        Ok(approved)
    }

    #[tracing::instrument(
        name = "refunds.service.reject",
        skip(self, admin_notes),
        fields(refund_request_uuid = %request),
        err
    )]
    async fn reject(
        &self,
        request: RefundRequestUuid,
        admin_notes: Option<String>,
    ) -> Result<RefundRequestRecord, RefundsServiceError> {
        let mut tx = self.db.begin().await?;

        let outcome = RefundOutcome {
            status: RefundStatus::Rejected,
            admin_notes: admin_notes.as_deref(),
            refund_amount: None,
        };

        let Some(rejected) = self.repository.decide(&mut tx, request, outcome).await? else {
            return Err(self.not_pending(&mut tx, request).await);
        };

        tx.commit().await?;

        info!("refund rejected");

        Ok(rejected)
    }
}

#[automock]
#[async_trait]
pub trait RefundsService: Send + Sync {
    /// Open a refund request for one of the user's purchases.
    async fn request_refund(
        &self,
        user: UserUuid,
        purchase: PurchaseUuid,
        reason: String,
    ) -> Result<RefundRequestRecord, RefundsServiceError>;

    /// The user's requests, newest first.
    async fn list_for_user(
        &self,
        user: UserUuid,
    ) -> Result<Vec<RefundRequestRecord>, RefundsServiceError>;

    /// Requests across all users, optionally filtered by status.
    async fn list(
        &self,
        status: Option<RefundStatus>,
    ) -> Result<Vec<RefundRequestRecord>, RefundsServiceError>;

    /// Approve a pending request and credit its amount to the customer's store credit.
    async fn approve(
        &self,
        request: RefundRequestUuid,
        decision: RefundDecision,
    ) -> Result<RefundRequestRecord, RefundsServiceError>;

    /// Reject a pending request. No money moves.
    async fn reject(
        &self,
        request: RefundRequestUuid,
        admin_notes: Option<String>,
    ) -> Result<RefundRequestRecord, RefundsServiceError>;
}
