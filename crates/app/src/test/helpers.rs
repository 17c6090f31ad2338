//! Test Helpers
//!
//! Users and products are owned by the surrounding storefront, so fixtures insert them
//! directly.

use sqlx::query;
use storefront::{
    allocation::{Allocation, PaymentMethod},
    cart::CartLine,
    money::sgd,
    pricing::OrderPricing,
    receipt::Receipt,
};
use testresult::TestResult;
use uuid::Uuid;

use crate::{
    domain::{
        products::records::ProductUuid,
        purchases::{PgPurchasesRepository, data::NewPurchase},
        users::records::UserUuid,
    },
    test::TestContext,
};

pub(crate) async fn create_user(ctx: &TestContext, username: &str) -> TestResult<UserUuid> {
    let user = UserUuid::new();

    query("INSERT INTO users (uuid, username, email) VALUES ($1, $2, $3)")
        .bind(user.into_uuid())
        .bind(username)
        .bind(format!("{username}@example.test"))
        .execute(ctx.db.pool())
        .await?;

    Ok(user)
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    name: &str,
    price: i64,
) -> TestResult<ProductUuid> {
    let product = ProductUuid::new();

    query("INSERT INTO products (uuid, name, price) VALUES ($1, $2, $3)")
        .bind(product.into_uuid())
        .bind(name)
        .bind(price)
        .execute(ctx.db.pool())
        .await?;

    Ok(product)
}

/// Set a user's e-wallet balance and points.
pub(crate) async fn fund_wallet(
    ctx: &TestContext,
    user: UserUuid,
    e_wallet: i64,
    points: i64,
) -> TestResult {
    query("UPDATE users SET e_wallet_balance = $2, points_balance = $3 WHERE uuid = $1")
        .bind(user.into_uuid())
        .bind(e_wallet)
        .bind(points)
        .execute(ctx.db.pool())
        .await?;

    Ok(())
}

/// Record a card purchase of two $25.00 items ($58.50 with tax and shipping) without running
/// any settlement side effects.
pub(crate) async fn settled_purchase(ctx: &TestContext, user: UserUuid) -> TestResult<Uuid> {
    let product = create_product(ctx, "Kopi Beans", 2_500).await?;

    let pricing = OrderPricing::for_subtotal(sgd(5_000))?;
    let total = pricing.base_total()?;

    let receipt = Receipt::new(
        [CartLine::new(
            product.into_uuid(),
            "Kopi Beans",
            sgd(2_500),
            2,
        )],
        pricing,
        Allocation {
            store_credit_used: sgd(0),
            e_wallet_used: sgd(0),
            remaining_for_gateway: total,
        },
        PaymentMethod::Card,
    )?;

    let purchase = NewPurchase::from_receipt(
        user,
        &receipt,
        "Card **** 1111".to_string(),
        format!("card:{}", Uuid::now_v7()),
        None,
    )?;

    let mut tx = ctx.db.pool().begin().await?;

    let (record, _replayed) = PgPurchasesRepository::new()
        .record_purchase(&mut tx, &purchase)
        .await?;

    tx.commit().await?;

    Ok(record.uuid.into_uuid())
}
