//! App Context

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::{
    checkout::{
        CheckoutService, CheckoutSettings, PgCheckoutService,
        settlement::Settler,
        tasks::{TaskFailures, TaskQueue, TaskRunner},
    },
    database::{self, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        purchases::{PgPurchasesService, PurchasesService},
        refunds::{PgRefundsService, RefundsService},
        vouchers::{PgVouchersService, VouchersService},
        wallets::{PgWalletsService, WalletsService},
    },
    gateways::{NetsClient, NetsConfig, PayPalClient, PayPalConfig, RetryPolicy},
};

/// How often expired checkout sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Gateway credentials and retry behaviour.
#[derive(Debug, Clone)]
pub struct GatewaysConfig {
    pub paypal: PayPalConfig,
    pub nets: NetsConfig,
    pub retry: RetryPolicy,
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartsService>,
    pub wallets: Arc<dyn WalletsService>,
    pub vouchers: Arc<dyn VouchersService>,
    pub purchases: Arc<dyn PurchasesService>,
    pub refunds: Arc<dyn RefundsService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub task_failures: TaskFailures,
}

/// Background workers started with the context.
#[derive(Debug)]
pub struct AppWorkers {
    handles: Vec<JoinHandle<()>>,
}

impl AppWorkers {
    /// Wait for every worker to stop once the shutdown token fires.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(error) = handle.await {
                warn!(error = %error, "background worker ended abnormally");
            }
        }
    }
}

impl AppContext {
    /// Build application context from a database URL, starting the settlement task worker and
    /// the checkout session sweeper.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        gateways: GatewaysConfig,
        settings: CheckoutSettings,
        shutdown: CancellationToken,
    ) -> Result<(Self, AppWorkers), AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool);

        let carts = Arc::new(PgCartsService::new(db.clone()));
        let wallets = Arc::new(PgWalletsService::new(db.clone()));
        let vouchers = Arc::new(PgVouchersService::new(db.clone()));

        let runner = TaskRunner::new(
            wallets.clone(),
            carts.clone(),
            gateways.retry,
        );

        let (tasks, task_worker) = TaskQueue::spawn(runner, shutdown.clone());
        let task_failures = tasks.failures();

        let checkout = PgCheckoutService::new(
            Settler::new(db.clone(), tasks),
            carts.clone(),
            wallets.clone(),
            vouchers.clone(),
            Arc::new(PayPalClient::new(gateways.paypal, gateways.retry)),
            Arc::new(NetsClient::new(gateways.nets, gateways.retry)),
            settings,
        );

        let sweeper = checkout
            .sessions()
            .spawn_sweeper(SESSION_SWEEP_INTERVAL, shutdown);

        let context = Self {
            carts,
            wallets,
            vouchers,
            purchases: Arc::new(PgPurchasesService::new(db.clone())),
            refunds: Arc::new(PgRefundsService::new(db)),
            checkout: Arc::new(checkout),
            task_failures,
        };

        Ok((
            context,
            AppWorkers {
                handles: vec![task_worker, sweeper],
            },
        ))
    }
}
