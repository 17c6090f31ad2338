//! Refunds Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};
use storefront::refunds::RefundStatus;

use crate::{
    database::try_get_parsed,
    domain::{
        purchases::records::PurchaseUuid,
        refunds::records::{RefundRequestRecord, RefundRequestUuid},
        users::records::UserUuid,
    },
};

const INSERT_REFUND_REQUEST_SQL: &str = include_str!("sql/insert_refund_request.sql");
const LIST_PURCHASE_REFUND_STATUSES_SQL: &str =
    include_str!("sql/list_purchase_refund_statuses.sql");
const GET_REFUND_REQUEST_SQL: &str = include_str!("sql/get_refund_request.sql");
const LIST_USER_REFUND_REQUESTS_SQL: &str = include_str!("sql/list_user_refund_requests.sql");
const LIST_REFUND_REQUESTS_SQL: &str = include_str!("sql/list_refund_requests.sql");
const DECIDE_REFUND_REQUEST_SQL: &str = include_str!("sql/decide_refund_request.sql");

/// Outcome written to a pending request.
pub(crate) struct RefundOutcome<'a> {
    pub(crate) status: RefundStatus,
    pub(crate) admin_notes: Option<&'a str>,
    pub(crate) refund_amount: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgRefundsRepository;

impl PgRefundsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn insert_request(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        purchase: PurchaseUuid,
        user: UserUuid,
        reason: &str,
    ) -> Result<RefundRequestRecord, sqlx::Error> {
        query_as::<Postgres, RefundRequestRecord>(INSERT_REFUND_REQUEST_SQL)
            .bind(RefundRequestUuid::new().into_uuid())
            .bind(purchase.into_uuid())
            .bind(user.into_uuid())
            .bind(reason)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn purchase_statuses(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        purchase: PurchaseUuid,
    ) -> Result<Vec<RefundStatus>, sqlx::Error> {
        let raw = query_scalar::<Postgres, String>(LIST_PURCHASE_REFUND_STATUSES_SQL)
            .bind(purchase.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        raw.iter()
            .map(|status| {
                status
                    .parse::<RefundStatus>()
                    .map_err(|error| sqlx::Error::ColumnDecode {
                        index: "status".to_string(),
                        source: Box::new(error),
                    })
            })
            .collect()
    }

    pub(crate) async fn get_request(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: RefundRequestUuid,
    ) -> Result<RefundRequestRecord, sqlx::Error> {
        query_as::<Postgres, RefundRequestRecord>(GET_REFUND_REQUEST_SQL)
            .bind(request.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<RefundRequestRecord>, sqlx::Error> {
        query_as::<Postgres, RefundRequestRecord>(LIST_USER_REFUND_REQUESTS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        status: Option<RefundStatus>,
    ) -> Result<Vec<RefundRequestRecord>, sqlx::Error> {
        query_as::<Postgres, RefundRequestRecord>(LIST_REFUND_REQUESTS_SQL)
            .bind(status.map(RefundStatus::as_str))
            .fetch_all(&mut **tx)
            .await
    }

    /// Move a pending request to its outcome. `None` if it was not pending.
    pub(crate) async fn decide(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: RefundRequestUuid,
        outcome: RefundOutcome<'_>,
    ) -> Result<Option<RefundRequestRecord>, sqlx::Error> {
        query_as::<Postgres, RefundRequestRecord>(DECIDE_REFUND_REQUEST_SQL)
            .bind(request.into_uuid())
            .bind(outcome.status.as_str())
            .bind(outcome.admin_notes)
            .bind(outcome.refund_amount)
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for RefundRequestRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: RefundRequestUuid::from_uuid(row.try_get("uuid")?),
            purchase: PurchaseUuid::from_uuid(row.try_get("purchase_uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            reason: row.try_get("reason")?,
            status: try_get_parsed(row, "status")?,
            admin_notes: row.try_get("admin_notes")?,
            refund_amount: row.try_get("refund_amount")?,
            requested_at: row.try_get::<SqlxTimestamp, _>("requested_at")?.to_jiff(),
            processed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("processed_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
