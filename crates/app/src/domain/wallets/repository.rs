//! Wallets Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    database::try_get_parsed,
    domain::{
        users::records::UserUuid,
        wallets::records::{
            PointsTransactionKind, PointsTransactionRecord, PointsTransactionUuid,
            WalletInstrument, WalletRecord, WalletTransactionKind, WalletTransactionRecord,
            WalletTransactionStatus, WalletTransactionUuid,
        },
    },
};

const GET_WALLET_SQL: &str = include_str!("sql/get_wallet.sql");
const LOCK_WALLET_SQL: &str = include_str!("sql/lock_wallet.sql");
const SET_AUTO_CONVERT_SQL: &str = include_str!("sql/set_auto_convert.sql");
const ADJUST_E_WALLET_SQL: &str = include_str!("sql/adjust_e_wallet.sql");
const ADJUST_STORE_CREDIT_SQL: &str = include_str!("sql/adjust_store_credit.sql");
const ADJUST_POINTS_SQL: &str = include_str!("sql/adjust_points.sql");
const INSERT_WALLET_TRANSACTION_SQL: &str = include_str!("sql/insert_wallet_transaction.sql");
const GET_WALLET_TRANSACTION_SQL: &str = include_str!("sql/get_wallet_transaction.sql");
const TRANSITION_TOP_UP_SQL: &str = include_str!("sql/transition_top_up.sql");
const LIST_WALLET_TRANSACTIONS_SQL: &str = include_str!("sql/list_wallet_transactions.sql");
const INSERT_POINTS_TRANSACTION_SQL: &str = include_str!("sql/insert_points_transaction.sql");
const LIST_POINTS_TRANSACTIONS_SQL: &str = include_str!("sql/list_points_transactions.sql");

/// A wallet transaction row to insert.
#[derive(Debug, Clone)]
pub(crate) struct NewWalletTransaction<'a> {
    pub(crate) user: UserUuid,
    pub(crate) amount: i64,
    pub(crate) kind: WalletTransactionKind,
    pub(crate) instrument: WalletInstrument,
    pub(crate) status: WalletTransactionStatus,
    pub(crate) payment_method: Option<&'a str>,
    pub(crate) description: Option<&'a str>,
    pub(crate) reference: &'a str,
}

/// A points transaction row to insert.
#[derive(Debug, Clone)]
pub(crate) struct NewPointsTransaction<'a> {
    pub(crate) user: UserUuid,
    pub(crate) points: i64,
    pub(crate) kind: PointsTransactionKind,
    pub(crate) description: &'a str,
    pub(crate) purchase: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgWalletsRepository;

impl PgWalletsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_wallet(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<WalletRecord, sqlx::Error> {
        query_as::<Postgres, WalletRecord>(GET_WALLET_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Read balances and hold the row lock until the transaction ends.
    pub(crate) async fn lock_wallet(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<WalletRecord, sqlx::Error> {
        query_as::<Postgres, WalletRecord>(LOCK_WALLET_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_auto_convert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        enabled: bool,
    ) -> Result<WalletRecord, sqlx::Error> {
        query_as::<Postgres, WalletRecord>(SET_AUTO_CONVERT_SQL)
            .bind(user.into_uuid())
            .bind(enabled)
            .fetch_one(&mut **tx)
            .await
    }

    /// Add `delta` minor units to a balance. The balance check constraint rejects overdrafts.
    pub(crate) async fn adjust_balance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        instrument: WalletInstrument,
        delta: i64,
    ) -> Result<WalletRecord, sqlx::Error> {
        let sql = match instrument {
            WalletInstrument::EWallet => ADJUST_E_WALLET_SQL,
            WalletInstrument::StoreCredit => ADJUST_STORE_CREDIT_SQL,
        };

        query_as::<Postgres, WalletRecord>(sql)
            .bind(user.into_uuid())
            .bind(delta)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn adjust_points(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        delta: i64,
    ) -> Result<WalletRecord, sqlx::Error> {
        query_as::<Postgres, WalletRecord>(ADJUST_POINTS_SQL)
            .bind(user.into_uuid())
            .bind(delta)
            .fetch_one(&mut **tx)
            .await
    }

    /// Insert a wallet transaction, returning `None` if an equivalent deduction already exists.
    pub(crate) async fn insert_transaction(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        transaction: NewWalletTransaction<'_>,
    ) -> Result<Option<WalletTransactionRecord>, sqlx::Error> {
        query_as::<Postgres, WalletTransactionRecord>(INSERT_WALLET_TRANSACTION_SQL)
            .bind(WalletTransactionUuid::new().into_uuid())
            .bind(transaction.user.into_uuid())
            .bind(transaction.amount)
            .bind(transaction.kind.as_str())
            .bind(transaction.instrument.as_str())
            .bind(transaction.status.as_str())
            .bind(transaction.payment_method)
            .bind(transaction.description)
            .bind(transaction.reference)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_transaction(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        transaction: WalletTransactionUuid,
    ) -> Result<WalletTransactionRecord, sqlx::Error> {
        query_as::<Postgres, WalletTransactionRecord>(GET_WALLET_TRANSACTION_SQL)
            .bind(transaction.into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Move a pending top-up to `status`, returning `None` if it was not pending.
    pub(crate) async fn transition_top_up(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        transaction: WalletTransactionUuid,
        status: WalletTransactionStatus,
    ) -> Result<Option<WalletTransactionRecord>, sqlx::Error> {
        query_as::<Postgres, WalletTransactionRecord>(TRANSITION_TOP_UP_SQL)
            .bind(transaction.into_uuid())
            .bind(user.into_uuid())
            .bind(status.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_transactions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        limit: u32,
    ) -> Result<Vec<WalletTransactionRecord>, sqlx::Error> {
        query_as::<Postgres, WalletTransactionRecord>(LIST_WALLET_TRANSACTIONS_SQL)
            .bind(user.into_uuid())
            .bind(i64::from(limit))
            .fetch_all(&mut **tx)
            .await
    }

    /// Insert a points transaction, returning `None` if the purchase already earned points.
    pub(crate) async fn insert_points_transaction(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        transaction: NewPointsTransaction<'_>,
    ) -> Result<Option<PointsTransactionRecord>, sqlx::Error> {
        query_as::<Postgres, PointsTransactionRecord>(INSERT_POINTS_TRANSACTION_SQL)
            .bind(PointsTransactionUuid::new().into_uuid())
            .bind(transaction.user.into_uuid())
            .bind(transaction.points)
            .bind(transaction.kind.as_str())
            .bind(transaction.description)
            .bind(transaction.purchase)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_points_transactions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        limit: u32,
    ) -> Result<Vec<PointsTransactionRecord>, sqlx::Error> {
        query_as::<Postgres, PointsTransactionRecord>(LIST_POINTS_TRANSACTIONS_SQL)
            .bind(user.into_uuid())
            .bind(i64::from(limit))
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for WalletRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            user: UserUuid::from_uuid(row.try_get("uuid")?),
            e_wallet_balance: row.try_get("e_wallet_balance")?,
            points_balance: row.try_get("points_balance")?,
            store_credit: row.try_get("store_credit")?,
            auto_convert_points: row.try_get("auto_convert_points")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for WalletTransactionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: WalletTransactionUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            amount: row.try_get("amount")?,
            kind: try_get_parsed(row, "kind")?,
            instrument: try_get_parsed(row, "instrument")?,
            status: try_get_parsed(row, "status")?,
            payment_method: row.try_get("payment_method")?,
            description: row.try_get("description")?,
            reference_id: row.try_get("reference_id")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for PointsTransactionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PointsTransactionUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            points: row.try_get("points")?,
            kind: try_get_parsed(row, "kind")?,
            description: row.try_get("description")?,
            purchase: row.try_get("purchase_uuid")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
