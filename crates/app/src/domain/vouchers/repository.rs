//! Vouchers Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, Postgres, Row, Transaction,
    postgres::{PgArguments, PgRow},
    query,
    query::QueryAs,
    query_as,
};
use uuid::Uuid;

use crate::{
    database::try_get_parsed,
    domain::{
        users::records::UserUuid,
        vouchers::{
            data::VoucherDraft,
            records::{
                ClaimableVoucherRecord, VoucherClaimRecord, VoucherClaimUuid, VoucherRecord,
                VoucherUuid,
            },
        },
    },
};

const LIST_VOUCHERS_SQL: &str = include_str!("sql/list_vouchers.sql");
const GET_VOUCHER_SQL: &str = include_str!("sql/get_voucher.sql");
const CREATE_VOUCHER_SQL: &str = include_str!("sql/create_voucher.sql");
const UPDATE_VOUCHER_SQL: &str = include_str!("sql/update_voucher.sql");
const DELETE_VOUCHER_SQL: &str = include_str!("sql/delete_voucher.sql");
const LIST_CLAIMABLE_SQL: &str = include_str!("sql/list_claimable.sql");
const CREATE_CLAIM_SQL: &str = include_str!("sql/create_claim.sql");
const LIST_CLAIMS_SQL: &str = include_str!("sql/list_claims.sql");
const FIND_CLAIM_BY_CODE_SQL: &str = include_str!("sql/find_claim_by_code.sql");
const MARK_CLAIM_USED_SQL: &str = include_str!("sql/mark_claim_used.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgVouchersRepository;

impl PgVouchersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_vouchers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<VoucherRecord>, sqlx::Error> {
        query_as::<Postgres, VoucherRecord>(LIST_VOUCHERS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_voucher(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        voucher: VoucherUuid,
    ) -> Result<VoucherRecord, sqlx::Error> {
        query_as::<Postgres, VoucherRecord>(GET_VOUCHER_SQL)
            .bind(voucher.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_voucher(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        voucher: VoucherUuid,
        draft: &VoucherDraft,
    ) -> Result<VoucherRecord, sqlx::Error> {
        let query = query_as::<Postgres, VoucherRecord>(CREATE_VOUCHER_SQL).bind(voucher.into_uuid());

        bind_draft(query, draft).fetch_one(&mut **tx).await
    }

    pub(crate) async fn update_voucher(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        voucher: VoucherUuid,
        draft: &VoucherDraft,
    ) -> Result<VoucherRecord, sqlx::Error> {
        let query = query_as::<Postgres, VoucherRecord>(UPDATE_VOUCHER_SQL).bind(voucher.into_uuid());

        bind_draft(query, draft).fetch_one(&mut **tx).await
    }

    pub(crate) async fn delete_voucher(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        voucher: VoucherUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_VOUCHER_SQL)
            .bind(voucher.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_claimable(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        now: Timestamp,
    ) -> Result<Vec<ClaimableVoucherRecord>, sqlx::Error> {
        query_as::<Postgres, ClaimableVoucherRecord>(LIST_CLAIMABLE_SQL)
            .bind(user.into_uuid())
            .bind(SqlxTimestamp::from(now))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_claim(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        voucher: VoucherUuid,
    ) -> Result<VoucherClaimRecord, sqlx::Error> {
        query_as::<Postgres, VoucherClaimRecord>(CREATE_CLAIM_SQL)
            .bind(VoucherClaimUuid::new().into_uuid())
            .bind(user.into_uuid())
            .bind(voucher.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_claims(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<VoucherClaimRecord>, sqlx::Error> {
        query_as::<Postgres, VoucherClaimRecord>(LIST_CLAIMS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn find_claim_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        code: &str,
    ) -> Result<VoucherClaimRecord, sqlx::Error> {
        query_as::<Postgres, VoucherClaimRecord>(FIND_CLAIM_BY_CODE_SQL)
            .bind(user.into_uuid())
            .bind(code)
            .fetch_one(&mut **tx)
            .await
    }

    /// Consume a claimed voucher. Returns false if it was already used.
    pub(crate) async fn mark_claim_used(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        claim: VoucherClaimUuid,
        purchase: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(MARK_CLAIM_USED_SQL)
            .bind(claim.into_uuid())
            .bind(purchase)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }
}

fn bind_draft<'q>(
    query: QueryAs<'q, Postgres, VoucherRecord, PgArguments>,
    draft: &'q VoucherDraft,
) -> QueryAs<'q, Postgres, VoucherRecord, PgArguments> {
    query
        .bind(draft.normalised_code())
        .bind(draft.description.as_str())
        .bind(draft.discount_kind.as_str())
        .bind(draft.discount_value)
        .bind(draft.min_spend)
        .bind(SqlxTimestamp::from(draft.starts_at))
        .bind(SqlxTimestamp::from(draft.ends_at))
        .bind(draft.is_active)
}

impl<'r> FromRow<'r, PgRow> for VoucherRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: VoucherUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            description: row.try_get("description")?,
            discount_kind: try_get_parsed(row, "discount_kind")?,
            discount_value: row.try_get("discount_value")?,
            min_spend: row.try_get("min_spend")?,
            starts_at: row.try_get::<SqlxTimestamp, _>("starts_at")?.to_jiff(),
            ends_at: row.try_get::<SqlxTimestamp, _>("ends_at")?.to_jiff(),
            is_active: row.try_get("is_active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for VoucherClaimRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: VoucherClaimUuid::from_uuid(row.try_get("claim_uuid")?),
            user: UserUuid::from_uuid(row.try_get("claim_user_uuid")?),
            voucher: VoucherRecord::from_row(row)?,
            status: try_get_parsed(row, "claim_status")?,
            purchase: row.try_get("claim_purchase_uuid")?,
            claimed_at: row.try_get::<SqlxTimestamp, _>("claimed_at")?.to_jiff(),
            used_at: row
                .try_get::<Option<SqlxTimestamp>, _>("used_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ClaimableVoucherRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            voucher: VoucherRecord::from_row(row)?,
            claimed: row.try_get("claimed")?,
        })
    }
}
