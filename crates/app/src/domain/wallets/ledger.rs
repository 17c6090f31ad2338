//! Wallet Ledger
//!
//! Balance adjustments paired with their log rows, run inside a caller's transaction so other
//! domains can move money atomically with their own writes.

use rusty_money::{Money, iso::Currency};
use sqlx::{Postgres, Transaction};
use storefront::{
    money::{currency, to_decimal_string},
    wallet::{
        PointsAccrual, accrue_points, clamped_deduction, credit_for_points, ensure_points,
        ensure_sufficient,
    },
};
use tracing::{info, warn};

use crate::domain::{
    users::records::UserUuid,
    wallets::{
        data::{FundsMovement, PointsCredit},
        errors::WalletsServiceError,
        records::{
            PointsTransactionKind, WalletInstrument, WalletRecord, WalletTransactionKind,
            WalletTransactionRecord, WalletTransactionStatus,
        },
        repository::{NewPointsTransaction, NewWalletTransaction, PgWalletsRepository},
    },
};

#[derive(Debug, Clone, Default)]
pub(crate) struct WalletLedger {
    repository: PgWalletsRepository,
}

impl WalletLedger {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            repository: PgWalletsRepository::new(),
        }
    }

    pub(crate) fn repository(&self) -> &PgWalletsRepository {
        &self.repository
    }

    /// Credit an instrument and log a completed transaction of `kind`.
    pub(crate) async fn credit(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        movement: &FundsMovement,
        kind: WalletTransactionKind,
    ) -> Result<WalletTransactionRecord, WalletsServiceError> {
        let amount = movement.amount.to_minor_units();

        if amount <= 0 {
            return Err(WalletsServiceError::InvalidData);
        }

        let transaction = self
            .repository
            .insert_transaction(
                tx,
                NewWalletTransaction {
                    user,
                    amount,
                    kind,
                    instrument: movement.instrument,
                    status: WalletTransactionStatus::Completed,
                    payment_method: movement.payment_method.as_deref(),
                    description: Some(&movement.description),
                    reference: &movement.reference,
                },
            )
            .await?
            .ok_or(WalletsServiceError::AlreadyExists)?;

        self.repository
            .adjust_balance(tx, user, movement.instrument, amount)
            .await?;

        Ok(transaction)
    }

    /// Take up to `movement.amount` from an instrument, never below zero.
    ///
    /// Returns `None` when a deduction for the same reference and instrument was already logged.
    pub(crate) async fn deduct(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        movement: &FundsMovement,
    ) -> Result<Option<WalletTransactionRecord>, WalletsServiceError> {
        let wallet = self.repository.lock_wallet(tx, user).await?;
        let balance = wallet.balance_of(movement.instrument);
        let taken = clamped_deduction(movement.amount, balance)?;

        if taken.to_minor_units() < movement.amount.to_minor_units() {
            warn!(
                user_uuid = %user,
                instrument = %movement.instrument,
                requested = movement.amount.to_minor_units(),
                taken = taken.to_minor_units(),
                "deduction clamped to available balance"
            );
        }

        let Some(transaction) = self
            .repository
            .insert_transaction(
                tx,
                NewWalletTransaction {
                    user,
                    amount: taken.to_minor_units(),
                    kind: WalletTransactionKind::Deduction,
                    instrument: movement.instrument,
                    status: WalletTransactionStatus::Completed,
                    payment_method: movement.payment_method.as_deref(),
                    description: Some(&movement.description),
                    reference: &movement.reference,
                },
            )
            .await?
        else {
            return Ok(None);
        };

        if taken.to_minor_units() > 0 {
            self.repository
                .adjust_balance(tx, user, movement.instrument, -taken.to_minor_units())
                .await?;
        }

        Ok(Some(transaction))
    }

    /// Take exactly `movement.amount` from an instrument, failing if the locked balance does not
    /// cover it or the reference was already charged.
    pub(crate) async fn withdraw(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        movement: &FundsMovement,
    ) -> Result<WalletTransactionRecord, WalletsServiceError> {
        let amount = movement.amount.to_minor_units();

        if amount <= 0 {
            return Err(WalletsServiceError::InvalidData);
        }

        let wallet = self.repository.lock_wallet(tx, user).await?;

        ensure_sufficient(&movement.amount, &wallet.balance_of(movement.instrument))?;

        let transaction = self
            .repository
            .insert_transaction(
                tx,
                NewWalletTransaction {
                    user,
                    amount,
                    kind: WalletTransactionKind::Deduction,
                    instrument: movement.instrument,
                    status: WalletTransactionStatus::Completed,
                    payment_method: movement.payment_method.as_deref(),
                    description: Some(&movement.description),
                    reference: &movement.reference,
                },
            )
            .await?
            .ok_or(WalletsServiceError::AlreadyExists)?;

        self.repository
            .adjust_balance(tx, user, movement.instrument, -amount)
            .await?;

        Ok(transaction)
    }

    /// Credit earned points, auto-converting whole units to store credit when enabled.
    ///
    /// Returns `None` when nothing was applied: no points, or the purchase already earned.
    pub(crate) async fn accrue(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        credit: &PointsCredit,
    ) -> Result<Option<PointsAccrual<'static>>, WalletsServiceError> {
        if credit.points <= 0 {
            return Ok(None);
        }

        let wallet = self.repository.lock_wallet(tx, user).await?;

        let earned = self
            .repository
            .insert_points_transaction(
                tx,
                NewPointsTransaction {
                    user,
                    points: credit.points,
                    kind: PointsTransactionKind::Earned,
                    description: &credit.description,
                    purchase: credit.purchase,
                },
            )
            .await?;

        if earned.is_none() {
            return Ok(None);
        }

        let accrual = accrue_points(
            wallet.points_balance,
            credit.points,
            wallet.auto_convert_points,
            currency(),
        )?;

        self.repository
            .adjust_points(tx, user, credit.points - accrual.converted)
            .await?;

        if accrual.converted > 0 {
            self.record_conversion(tx, user, accrual.converted, &accrual.credit)
                .await?;

            info!(
                user_uuid = %user,
                points = accrual.converted,
                credit = accrual.credit.to_minor_units(),
                "auto-converted points"
            );
        }

        Ok(Some(accrual))
    }

    /// Convert points to store credit at 100 points per 1.00.
    pub(crate) async fn convert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        points: i64,
    ) -> Result<WalletRecord, WalletsServiceError> {
        let wallet = self.repository.lock_wallet(tx, user).await?;
        let credit = credit_for_points(points, wallet.points_balance, currency())?;

        self.repository.adjust_points(tx, user, -points).await?;

        self.record_conversion(tx, user, points, &credit).await
    }

    /// Spend points, failing if the balance does not cover them.
    pub(crate) async fn spend(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        points: i64,
        description: &str,
    ) -> Result<WalletRecord, WalletsServiceError> {
        let wallet = self.repository.lock_wallet(tx, user).await?;

        ensure_points(points, wallet.points_balance)?;

        self.repository
            .insert_points_transaction(
                tx,
                NewPointsTransaction {
                    user,
                    points: -points,
                    kind: PointsTransactionKind::Spent,
                    description,
                    purchase: None,
                },
            )
            .await?;

        Ok(self.repository.adjust_points(tx, user, -points).await?)
    }

    async fn record_conversion(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        points: i64,
        credit: &Money<'_, Currency>,
    ) -> Result<WalletRecord, WalletsServiceError> {
        self.repository
            .insert_points_transaction(
                tx,
                NewPointsTransaction {
                    user,
                    points: -points,
                    kind: PointsTransactionKind::Redeemed,
                    description: &conversion_description(points, credit),
                    purchase: None,
                },
            )
            .await?;

        Ok(self
            .repository
            .adjust_balance(
                tx,
                user,
                WalletInstrument::StoreCredit,
                credit.to_minor_units(),
            )
            .await?)
    }
}

pub(crate) fn conversion_description(points: i64, credit: &Money<'_, Currency>) -> String {
    format!(
        "{points} points converted to ${} store credit",
        to_decimal_string(credit)
    )
}
