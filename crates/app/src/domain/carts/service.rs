//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{
            data::NewCartItem, errors::CartsServiceError, records::CartItemRecord,
            repository::PgCartItemsRepository,
        },
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    repository: PgCartItemsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCartItemsRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn list_items(&self, user: UserUuid) -> Result<Vec<CartItemRecord>, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let items = self.repository.list_items(&mut tx, user).await?;

        tx.commit().await?;

        Ok(items)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, item),
        fields(user_uuid = %user, product_uuid = %item.product),
        err
    )]
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError> {
        if item.quantity == 0 {
            return Err(CartsServiceError::ZeroQuantity);
        }

        let mut tx = self.db.begin().await?;

        self.repository.find_product(&mut tx, item.product).await?;

        let added = self
            .repository
            .add_item(&mut tx, user, item.product, item.quantity)
            .await?;

        tx.commit().await?;

        Ok(added)
    }

    #[tracing::instrument(name = "carts.service.clear", skip(self), fields(user_uuid = %user), err)]
    async fn clear(&self, user: UserUuid) -> Result<u64, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let removed = self.repository.clear(&mut tx, user).await?;

        tx.commit().await?;

        info!(removed, "cleared cart");

        Ok(removed)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Cart items with the catalog name and price at the time of reading.
    async fn list_items(&self, user: UserUuid) -> Result<Vec<CartItemRecord>, CartsServiceError>;

    /// Add a product to the cart, increasing the quantity if it is already present.
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Remove every item from the cart, returning how many were removed.
    async fn clear(&self, user: UserUuid) -> Result<u64, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{carts::records::to_cart, products::records::ProductUuid},
        test::{
            TestContext,
            helpers::{create_product, create_user},
        },
    };

    use super::*;

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn adding_same_product_twice_merges_quantity() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "alice").await?;
        let product = create_product(&ctx, "Kopi Beans", 2_500).await?;

        ctx.carts
            .add_item(user, NewCartItem { product, quantity: 1 })
            .await?;

        let item = ctx
            .carts
            .add_item(user, NewCartItem { product, quantity: 2 })
            .await?;

        assert_eq!(item.quantity, 3);
        assert_eq!(item.product_name, "Kopi Beans");
        assert_eq!(item.unit_price, 2_500);

        let items = ctx.carts.list_items(user).await?;

        assert_eq!(items.len(), 1);
        assert_eq!(to_cart(&items)?.subtotal()?.to_minor_units(), 7_500);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn adding_unknown_product_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "bob").await?;

        let result = ctx
            .carts
            .add_item(
                user,
                NewCartItem {
                    product: ProductUuid::new(),
                    quantity: 1,
                },
            )
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn clear_removes_only_the_users_items() -> TestResult {
        let ctx = TestContext::new().await;
        let alice = create_user(&ctx, "alice").await?;
        let bob = create_user(&ctx, "bob").await?;
        let product = create_product(&ctx, "Tote Bag", 1_000).await?;

        for user in [alice, bob] {
            ctx.carts
                .add_item(user, NewCartItem { product, quantity: 1 })
                .await?;
        }

        assert_eq!(ctx.carts.clear(alice).await?, 1);
        assert!(ctx.carts.list_items(alice).await?.is_empty());
        assert_eq!(ctx.carts.list_items(bob).await?.len(), 1);

        Ok(())
    }
}
