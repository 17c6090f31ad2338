//! Test context for service-level integration tests.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    checkout::{
        CheckoutSettings, PgCheckoutService,
        settlement::Settler,
        tasks::{TaskQueue, TaskRunner},
    },
    database::Db,
    domain::{
        carts::PgCartsService, purchases::PgPurchasesService, refunds::PgRefundsService,
        vouchers::PgVouchersService, wallets::PgWalletsService,
    },
    gateways::{MockQrGateway, MockRedirectGateway, RetryPolicy},
};

use super::db::TestDb;

pub struct TestContext {
    pub db: TestDb,
    pub carts: PgCartsService,
    pub wallets: PgWalletsService,
    pub vouchers: PgVouchersService,
    pub purchases: PgPurchasesService,
    pub refunds: PgRefundsService,
    pub settler: Settler,

    /// Checkout wired to gateway mocks with no expectations; card and internal flows only.
    pub checkout: PgCheckoutService,

    shutdown: CancellationToken,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        let carts = PgCartsService::new(db.clone());
        let wallets = PgWalletsService::new(db.clone());
        let vouchers = PgVouchersService::new(db.clone());

        let shutdown = CancellationToken::new();

        let runner = TaskRunner::new(
            Arc::new(wallets.clone()),
            Arc::new(carts.clone()),
            RetryPolicy::none(),
        );

        let (tasks, _worker) = TaskQueue::spawn(runner, shutdown.clone());
        let settler = Settler::new(db.clone(), tasks);

        let checkout = PgCheckoutService::new(
            settler.clone(),
            Arc::new(carts.clone()),
            Arc::new(wallets.clone()),
            Arc::new(vouchers.clone()),
            Arc::new(MockRedirectGateway::new()),
            Arc::new(MockQrGateway::new()),
            CheckoutSettings::default(),
        );

        Self {
            carts,
            wallets,
            vouchers,
            purchases: PgPurchasesService::new(db.clone()),
            refunds: PgRefundsService::new(db),
            settler,
            checkout,
            shutdown,
            db: test_db,
        }
    }

    /// Wait for queued post-settlement tasks to finish.
    pub async fn flush_tasks(&self) {
        self.settler.tasks().flush().await;
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
