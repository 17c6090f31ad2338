//! Wallets service.

use async_trait::async_trait;
use mockall::automock;
use storefront::wallet::validate_top_up;
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::{
        users::records::UserUuid,
        wallets::{
            data::{FundsMovement, NewTopUp, PointsCredit},
            errors::WalletsServiceError,
            ledger::WalletLedger,
            records::{
                PointsTransactionRecord, WalletInstrument, WalletRecord, WalletTransactionKind,
                WalletTransactionRecord, WalletTransactionStatus, WalletTransactionUuid,
            },
            repository::NewWalletTransaction,
        },
    },
};

/// Transactions shown in a wallet history view.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

#[derive(Debug, Clone)]
pub struct PgWalletsService {
    db: Db,
    ledger: WalletLedger,
}

impl PgWalletsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            ledger: WalletLedger::new(),
        }
    }
}

#[async_trait]
impl WalletsService for PgWalletsService {
    async fn get_wallet(&self, user: UserUuid) -> Result<WalletRecord, WalletsServiceError> {
        let mut tx = self.db.begin().await?;

        let wallet = self.ledger.repository().get_wallet(&mut tx, user).await?;

        tx.commit().await?;

        Ok(wallet)
    }

    #[tracing::instrument(name = "wallets.service.set_auto_convert", skip(self), fields(user_uuid = %user), err)]
    async fn set_auto_convert(
        &self,
        user: UserUuid,
        enabled: bool,
    ) -> Result<WalletRecord, WalletsServiceError> {
        let mut tx = self.db.begin().await?;

        let wallet = self
            .ledger
            .repository()
            .set_auto_convert(&mut tx, user, enabled)
            .await?;

        tx.commit().await?;

        Ok(wallet)
    }

    async fn list_transactions(
        &self,
        user: UserUuid,
        limit: u32,
    ) -> Result<Vec<WalletTransactionRecord>, WalletsServiceError> {
        let mut tx = self.db.begin().await?;

        let transactions = self
            .ledger
            .repository()
            .list_transactions(&mut tx, user, limit)
            .await?;

        tx.commit().await?;

        Ok(transactions)
    }

    async fn list_points_transactions(
        &self,
        user: UserUuid,
        limit: u32,
    ) -> Result<Vec<PointsTransactionRecord>, WalletsServiceError> {
        let mut tx = self.db.begin().await?;

        let transactions = self
            .ledger
            .repository()
            .list_points_transactions(&mut tx, user, limit)
            .await?;

        tx.commit().await?;

        Ok(transactions)
    }

    #[tracing::instrument(
        name = "wallets.service.add_funds",
        skip(self, movement),
        fields(
            user_uuid = %user,
            instrument = %movement.instrument,
            amount = movement.amount.to_minor_units(),
            transaction_uuid = tracing::field::Empty
        ),
        err
    )]
    async fn add_funds(
        &self,
        user: UserUuid,
        movement: FundsMovement,
    ) -> Result<WalletTransactionRecord, WalletsServiceError> {
        let mut tx = self.db.begin().await?;

        let transaction = self
            .ledger
            .credit(&mut tx, user, &movement, WalletTransactionKind::TopUp)
            .await?;

        tx.commit().await?;

        Span::current().record("transaction_uuid", tracing::field::display(transaction.uuid));

        info!(transaction_uuid = %transaction.uuid, "added funds");

        Ok(transaction)
    }

    #[tracing::instrument(
        name = "wallets.service.deduct_funds",
        skip(self, movement),
        fields(
            user_uuid = %user,
            instrument = %movement.instrument,
            reference = %movement.reference,
            requested = movement.amount.to_minor_units()
        ),
        err
    )]
    async fn deduct_funds(
        &self,
        user: UserUuid,
        movement: FundsMovement,
    ) -> Result<Option<WalletTransactionRecord>, WalletsServiceError> {
        let mut tx = self.db.begin().await?;

        let transaction = self.ledger.deduct(&mut tx, user, &movement).await?;

        tx.commit().await?;

        match &transaction {
            Some(transaction) => info!(taken = transaction.amount, "deducted funds"),
            None => info!("deduction already applied"),
        }

        Ok(transaction)
    }

    #[tracing::instrument(
        name = "wallets.service.add_points",
        skip(self, credit),
        fields(user_uuid = %user, points = credit.points),
        err
    )]
    async fn add_points(
        &self,
        user: UserUuid,
        credit: PointsCredit,
    ) -> Result<WalletRecord, WalletsServiceError> {
        let mut tx = self.db.begin().await?;

        let accrual = self.ledger.accrue(&mut tx, user, &credit).await?;
        let wallet = self.ledger.repository().get_wallet(&mut tx, user).await?;

        tx.commit().await?;

        if accrual.is_some() {
            info!(balance = wallet.points_balance, "credited points");
        }

        Ok(wallet)
    }

    #[tracing::instrument(name = "wallets.service.convert_points", skip(self), fields(user_uuid = %user), err)]
    async fn convert_points(
        &self,
        user: UserUuid,
        points: i64,
    ) -> Result<WalletRecord, WalletsServiceError> {
        let mut tx = self.db.begin().await?;

        let wallet = self.ledger.convert(&mut tx, user, points).await?;

        tx.commit().await?;

        info!(store_credit = wallet.store_credit, "converted points");

        Ok(wallet)
    }

    #[tracing::instrument(name = "wallets.service.spend_points", skip(self, description), fields(user_uuid = %user), err)]
    async fn spend_points(
        &self,
        user: UserUuid,
        points: i64,
        description: String,
    ) -> Result<WalletRecord, WalletsServiceError> {
        let mut tx = self.db.begin().await?;

        let wallet = self
            .ledger
            .spend(&mut tx, user, points, &description)
            .await?;

        tx.commit().await?;

        Ok(wallet)
    }

    #[tracing::instrument(
        name = "wallets.service.begin_top_up",
        skip(self, top_up),
        fields(user_uuid = %user, amount = top_up.amount.to_minor_units()),
        err
    )]
    async fn begin_top_up(
        &self,
        user: UserUuid,
        top_up: NewTopUp,
    ) -> Result<WalletTransactionRecord, WalletsServiceError> {
        validate_top_up(&top_up.amount)?;

        let reference = format!("TOPUP-{}", WalletTransactionUuid::new().into_uuid().simple());

        let mut tx = self.db.begin().await?;

        let transaction = self
            .ledger
            .repository()
            .insert_transaction(
                &mut tx,
                NewWalletTransaction {
                    user,
                    amount: top_up.amount.to_minor_units(),
                    kind: WalletTransactionKind::TopUp,
                    instrument: WalletInstrument::EWallet,
                    status: WalletTransactionStatus::Pending,
                    payment_method: Some(&top_up.payment_method),
                    description: Some("E-wallet top-up"),
                    reference: &reference,
                },
            )
            .await?
            .ok_or(WalletsServiceError::AlreadyExists)?;

        tx.commit().await?;

        info!(transaction_uuid = %transaction.uuid, "started top-up");

        Ok(transaction)
    }

    #[tracing::instrument(
        name = "wallets.service.confirm_top_up",
        skip(self),
        fields(user_uuid = %user, transaction_uuid = %transaction),
        err
    )]
    async fn confirm_top_up(
        &self,
        user: UserUuid,
        transaction: WalletTransactionUuid,
    ) -> Result<WalletTransactionRecord, WalletsServiceError> {
        let mut tx = self.db.begin().await?;

        let Some(completed) = self
            .ledger
            .repository()
            .transition_top_up(
                &mut tx,
                user,
                transaction,
                WalletTransactionStatus::Completed,
            )
            .await?
        else {
            // Distinguish a missing top-up from one already decided.
            self.ledger
                .repository()
                .get_transaction(&mut tx, user, transaction)
                .await?;

            return Err(WalletsServiceError::TopUpNotPending);
        };

        self.ledger
            .repository()
            .adjust_balance(&mut tx, user, WalletInstrument::EWallet, completed.amount)
            .await?;

        tx.commit().await?;

        info!(amount = completed.amount, "confirmed top-up");

        Ok(completed)
    }

    #[tracing::instrument(
        name = "wallets.service.fail_top_up",
        skip(self),
        fields(user_uuid = %user, transaction_uuid = %transaction),
        err
    )]
    async fn fail_top_up(
        &self,
        user: UserUuid,
        transaction: WalletTransactionUuid,
    ) -> Result<WalletTransactionRecord, WalletsServiceError> {
        let mut tx = self.db.begin().await?;

        let Some(failed) = self
            .ledger
            .repository()
            .transition_top_up(&mut tx, user, transaction, WalletTransactionStatus::Failed)
            .await?
        else {
            self.ledger
                .repository()
                .get_transaction(&mut tx, user, transaction)
                .await?;

            return Err(WalletsServiceError::TopUpNotPending);
        };

        tx.commit().await?;

        Ok(failed)
    }
}

#[automock]
#[async_trait]
pub trait WalletsService: Send + Sync {
    /// Current balances.
    async fn get_wallet(&self, user: UserUuid) -> Result<WalletRecord, WalletsServiceError>;

    /// Turn automatic conversion of points to store credit on or off.
    async fn set_auto_convert(
        &self,
        user: UserUuid,
        enabled: bool,
    ) -> Result<WalletRecord, WalletsServiceError>;

    /// Most recent e-wallet and store credit movements, newest first.
    async fn list_transactions(
        &self,
        user: UserUuid,
        limit: u32,
    ) -> Result<Vec<WalletTransactionRecord>, WalletsServiceError>;

    /// Most recent points movements, newest first.
    async fn list_points_transactions(
        &self,
        user: UserUuid,
        limit: u32,
    ) -> Result<Vec<PointsTransactionRecord>, WalletsServiceError>;

    /// Credit an instrument with a completed top-up.
    async fn add_funds(
        &self,
        user: UserUuid,
        movement: FundsMovement,
    ) -> Result<WalletTransactionRecord, WalletsServiceError>;

    /// Deduct from an instrument, clamping at zero. Returns `None` if this reference was
    /// already deducted.
    async fn deduct_funds(
        &self,
        user: UserUuid,
        movement: FundsMovement,
    ) -> Result<Option<WalletTransactionRecord>, WalletsServiceError>;

    /// Credit earned points, auto-converting when enabled.
    async fn add_points(
        &self,
        user: UserUuid,
        credit: PointsCredit,
    ) -> Result<WalletRecord, WalletsServiceError>;

    /// Convert a multiple of 100 points to store credit.
    async fn convert_points(
        &self,
        user: UserUuid,
        points: i64,
    ) -> Result<WalletRecord, WalletsServiceError>;

    /// Spend points, failing if the balance is insufficient.
    async fn spend_points(
        &self,
        user: UserUuid,
        points: i64,
        description: String,
    ) -> Result<WalletRecord, WalletsServiceError>;

    /// Record a pending e-wallet top-up.
    async fn begin_top_up(
        &self,
        user: UserUuid,
        top_up: NewTopUp,
    ) -> Result<WalletTransactionRecord, WalletsServiceError>;

    /// Complete a pending top-up and credit the e-wallet once.
    async fn confirm_top_up(
        &self,
        user: UserUuid,
        transaction: WalletTransactionUuid,
    ) -> Result<WalletTransactionRecord, WalletsServiceError>;

    /// Mark a pending top-up as failed.
    async fn fail_top_up(
        &self,
        user: UserUuid,
        transaction: WalletTransactionUuid,
    ) -> Result<WalletTransactionRecord, WalletsServiceError>;
}
