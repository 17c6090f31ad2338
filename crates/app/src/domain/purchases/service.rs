//! Purchases service.

use async_trait::async_trait;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        carts::{CartsServiceError, PgCartItemsRepository, records::CartItemRecord},
        purchases::{
            errors::PurchasesServiceError,
            records::{CustomerPurchaseRecord, PurchaseRecord, PurchaseUuid},
            repository::PgPurchasesRepository,
        },
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgPurchasesService {
    db: Db,
    repository: PgPurchasesRepository,
    cart_items: PgCartItemsRepository,
}

impl PgPurchasesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgPurchasesRepository::new(),
            cart_items: PgCartItemsRepository::new(),
        }
    }
}

#[async_trait]
impl PurchasesService for PgPurchasesService {
    async fn list_purchases(
        &self,
        user: UserUuid,
    ) -> Result<Vec<PurchaseRecord>, PurchasesServiceError> {
        let mut tx = self.db.begin().await?;

        let purchases = self.repository.list_purchases(&mut tx, user).await?;

        tx.commit().await?;

        Ok(purchases)
    }

    async fn get_purchase(
        &self,
        owner: Option<UserUuid>,
        purchase: PurchaseUuid,
    ) -> Result<PurchaseRecord, PurchasesServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .get_purchase(&mut tx, purchase, owner)
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_all_purchases(
        &self,
    ) -> Result<Vec<CustomerPurchaseRecord>, PurchasesServiceError> {
        let mut tx = self.db.begin().await?;

        let purchases = self.repository.list_all_purchases(&mut tx).await?;

        tx.commit().await?;

        Ok(purchases)
    }

    #[tracing::instrument(
        name = "purchases.service.reorder",
        skip(self),
        fields(user_uuid = %user, purchase_uuid = %purchase),
        err
    )]
    async fn reorder(
        &self,
        user: UserUuid,
        purchase: PurchaseUuid,
    ) -> Result<Vec<CartItemRecord>, PurchasesServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .get_purchase(&mut tx, purchase, Some(user))
            .await?;

        let mut added = Vec::with_capacity(record.lines.len());

        for line in &record.lines {
            match self.cart_items.find_product(&mut tx, line.product).await {
                Ok(_) => {}
                Err(sqlx::Error::RowNotFound) => {
                    warn!(product_uuid = %line.product, "skipping product no longer sold");
                    continue;
                }
                Err(error) => return Err(CartsServiceError::from(error).into()),
            }

            let item = self
                .cart_items
                .add_item(&mut tx, user, line.product, line.quantity)
                .await
                .map_err(CartsServiceError::from)?;

            added.push(item);
        }

        tx.commit().await?;

        info!(items = added.len(), "reordered purchase");

        Ok(added)
    }
}

#[automock]
#[async_trait]
pub trait PurchasesService: Send + Sync {
    /// The user's purchases with lines, newest first.
    async fn list_purchases(
        &self,
        user: UserUuid,
    ) -> Result<Vec<PurchaseRecord>, PurchasesServiceError>;

    /// A purchase with lines. When `owner` is given, other users' purchases are not found.
    async fn get_purchase(
        &self,
        owner: Option<UserUuid>,
        purchase: PurchaseUuid,
    ) -> Result<PurchaseRecord, PurchasesServiceError>;

    /// Every purchase with its customer, newest first.
    async fn list_all_purchases(
        &self,
    ) -> Result<Vec<CustomerPurchaseRecord>, PurchasesServiceError>;

    /// Add a past purchase's products back into the cart at current prices.
    async fn reorder(
        &self,
        user: UserUuid,
        purchase: PurchaseUuid,
    ) -> Result<Vec<CartItemRecord>, PurchasesServiceError>;
}
