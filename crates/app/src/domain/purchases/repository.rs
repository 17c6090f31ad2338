//! Purchases Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::{try_get_parsed, try_get_quantity},
    domain::{
        products::records::ProductUuid,
        purchases::{
            data::NewPurchase,
            records::{
                CustomerPurchaseRecord, PurchaseLineRecord, PurchaseLineUuid, PurchaseRecord,
                PurchaseUuid,
            },
        },
        users::records::{UserRecord, UserUuid},
        vouchers::records::VoucherClaimUuid,
    },
};

const INSERT_PURCHASE_SQL: &str = include_str!("sql/insert_purchase.sql");
const INSERT_PURCHASE_LINE_SQL: &str = include_str!("sql/insert_purchase_line.sql");
const GET_PURCHASE_BY_REFERENCE_SQL: &str = include_str!("sql/get_purchase_by_reference.sql");
const GET_PURCHASE_SQL: &str = include_str!("sql/get_purchase.sql");
const LIST_PURCHASES_SQL: &str = include_str!("sql/list_purchases.sql");
const LIST_PURCHASE_LINES_SQL: &str = include_str!("sql/list_purchase_lines.sql");
const LIST_ALL_PURCHASES_SQL: &str = include_str!("sql/list_all_purchases.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPurchasesRepository;

impl PgPurchasesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a purchase and its lines unless the gateway reference was already settled.
    ///
    /// Returns the stored purchase and whether it already existed.
    pub(crate) async fn record_purchase(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        purchase: &NewPurchase,
    ) -> Result<(PurchaseRecord, bool), sqlx::Error> {
        let inserted = query_as::<Postgres, PurchaseRecord>(INSERT_PURCHASE_SQL)
            .bind(purchase.uuid.into_uuid())
            .bind(purchase.user.into_uuid())
            .bind(purchase.subtotal)
            .bind(purchase.tax)
            .bind(purchase.shipping)
            .bind(purchase.voucher_discount)
            .bind(purchase.store_credit_used)
            .bind(purchase.e_wallet_used)
            .bind(purchase.total)
            .bind(purchase.payment_method.as_str())
            .bind(purchase.payment_details.as_str())
            .bind(purchase.gateway_reference.as_str())
            .bind(purchase.voucher_claim.map(VoucherClaimUuid::into_uuid))
            .bind(purchase.points_earned)
            .fetch_optional(&mut **tx)
            .await?;

        let Some(mut record) = inserted else {
            let mut existing = query_as::<Postgres, PurchaseRecord>(GET_PURCHASE_BY_REFERENCE_SQL)
                .bind(purchase.gateway_reference.as_str())
                .fetch_one(&mut **tx)
                .await?;

            existing.lines = self.list_lines(tx, existing.uuid).await?;

            return Ok((existing, true));
        };

        for (position, line) in purchase.lines.iter().enumerate() {
            let quantity = i32::try_from(line.quantity).map_err(|error| {
                sqlx::Error::ColumnDecode {
                    index: "quantity".to_string(),
                    source: Box::new(error),
                }
            })?;

            let position = i32::try_from(position).map_err(|error| sqlx::Error::ColumnDecode {
                index: "position".to_string(),
                source: Box::new(error),
            })?;

            let uuid = PurchaseLineUuid::new();

            query(INSERT_PURCHASE_LINE_SQL)
                .bind(uuid.into_uuid())
                .bind(record.uuid.into_uuid())
                .bind(line.product.into_uuid())
                .bind(line.product_name.as_str())
                .bind(line.unit_price)
                .bind(quantity)
                .bind(line.line_total)
                .bind(position)
                .execute(&mut **tx)
                .await?;

            record.lines.push(PurchaseLineRecord {
                uuid,
                product: line.product,
                product_name: line.product_name.clone(),
                unit_price: line.unit_price,
                quantity: line.quantity,
                line_total: line.line_total,
            });
        }

        Ok((record, false))
    }

    /// Fetch a purchase with its lines, optionally restricted to its owner.
    pub(crate) async fn get_purchase(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        purchase: PurchaseUuid,
        owner: Option<UserUuid>,
    ) -> Result<PurchaseRecord, sqlx::Error> {
        let mut record = query_as::<Postgres, PurchaseRecord>(GET_PURCHASE_SQL)
            .bind(purchase.into_uuid())
            .bind(owner.map(UserUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await?;

        record.lines = self.list_lines(tx, purchase).await?;

        Ok(record)
    }

    pub(crate) async fn list_purchases(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<PurchaseRecord>, sqlx::Error> {
        let mut purchases = query_as::<Postgres, PurchaseRecord>(LIST_PURCHASES_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        for purchase in &mut purchases {
            purchase.lines = self.list_lines(tx, purchase.uuid).await?;
        }

        Ok(purchases)
    }

    pub(crate) async fn list_all_purchases(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<CustomerPurchaseRecord>, sqlx::Error> {
        query_as::<Postgres, CustomerPurchaseRecord>(LIST_ALL_PURCHASES_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    async fn list_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        purchase: PurchaseUuid,
    ) -> Result<Vec<PurchaseLineRecord>, sqlx::Error> {
        query_as::<Postgres, PurchaseLineRecord>(LIST_PURCHASE_LINES_SQL)
            .bind(purchase.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for PurchaseRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PurchaseUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            subtotal: row.try_get("subtotal")?,
            tax: row.try_get("tax")?,
            shipping: row.try_get("shipping")?,
            voucher_discount: row.try_get("voucher_discount")?,
            store_credit_used: row.try_get("store_credit_used")?,
            e_wallet_used: row.try_get("e_wallet_used")?,
            total: row.try_get("total")?,
            payment_method: try_get_parsed(row, "payment_method")?,
            payment_details: row.try_get("payment_details")?,
            gateway_reference: row.try_get("gateway_reference")?,
            voucher_claim: row
                .try_get::<Option<Uuid>, _>("voucher_claim_uuid")?
                .map(VoucherClaimUuid::from_uuid),
            points_earned: row.try_get("points_earned")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            lines: Vec::new(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for PurchaseLineRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PurchaseLineUuid::from_uuid(row.try_get("uuid")?),
            product: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            product_name: row.try_get("product_name")?,
            unit_price: row.try_get("unit_price")?,
            quantity: try_get_quantity(row, "quantity")?,
            line_total: row.try_get("line_total")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CustomerPurchaseRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let purchase = PurchaseRecord::from_row(row)?;

        Ok(Self {
            customer: UserRecord {
                uuid: purchase.user,
                username: row.try_get("username")?,
                email: row.try_get("email")?,
                created_at: row.try_get::<SqlxTimestamp, _>("user_created_at")?.to_jiff(),
            },
            purchase,
        })
    }
}
