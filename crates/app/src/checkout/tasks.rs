//! Post-settlement Tasks
//!
//! Side effects that may trail a recorded purchase. Money and voucher claims move inside the
//! settlement transaction; what is left here is idempotent and retried on its own, and a task
//! that keeps failing is logged and never rolls the purchase back.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use smallvec::SmallVec;
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    domain::{
        carts::{CartsService, CartsServiceError},
        purchases::records::{PurchaseRecord, PurchaseUuid},
        users::records::UserUuid,
        wallets::{WalletsService, WalletsServiceError, data::PointsCredit},
    },
    gateways::RetryPolicy,
};

/// Batches waiting for the worker.
const QUEUE_CAPACITY: usize = 256;

/// One side effect of a settled purchase.
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementTask {
    AccruePoints {
        user: UserUuid,
        purchase: PurchaseUuid,
        points: i64,
    },
    ClearCart {
        user: UserUuid,
    },
}

pub type SettlementTasks = SmallVec<[SettlementTask; 2]>;

impl SettlementTask {
    /// Tasks a newly recorded purchase needs, in the order they run.
    #[must_use]
    pub fn for_purchase(purchase: &PurchaseRecord) -> SettlementTasks {
        let mut tasks = SettlementTasks::new();

        if purchase.points_earned > 0 {
            tasks.push(Self::AccruePoints {
                user: purchase.user,
                purchase: purchase.uuid,
                points: purchase.points_earned,
            });
        }

        tasks.push(Self::ClearCart {
            user: purchase.user,
        });

        tasks
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AccruePoints { .. } => "accrue_points",
            Self::ClearCart { .. } => "clear_cart",
        }
    }
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Wallet(#[from] WalletsServiceError),

    #[error(transparent)]
    Cart(#[from] CartsServiceError),
}

impl TaskError {
    /// Storage failures may clear up; rejected data will not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Wallet(WalletsServiceError::Sql(_))
                | Self::Cart(CartsServiceError::Sql(_))
        )
    }
}

/// Executes settlement tasks through the domain services.
#[derive(Clone)]
pub struct TaskRunner {
    wallets: Arc<dyn WalletsService>,
    carts: Arc<dyn CartsService>,
    retry: RetryPolicy,
}

impl TaskRunner {
    #[must_use]
    pub fn new(
        wallets: Arc<dyn WalletsService>,
        carts: Arc<dyn CartsService>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            wallets,
            carts,
            retry,
        }
    }

    /// Run one task once.
    ///
    /// # Errors
    ///
    /// Returns the service error that stopped the task.
    pub async fn run(&self, task: &SettlementTask) -> Result<(), TaskError> {
        match task {
            SettlementTask::AccruePoints {
                user,
                purchase,
                points,
            } => {
                self.wallets
                    .add_points(
                        *user,
                        PointsCredit {
                            points: *points,
                            description: format!("Earned from purchase {purchase}"),
                            purchase: Some(purchase.into_uuid()),
                        },
                    )
                    .await?;

                Ok(())
            }
            SettlementTask::ClearCart { user } => {
                self.carts.clear(*user).await?;

                Ok(())
            }
        }
    }

    /// Run every task, each with its own retries. Returns how many gave up.
    pub async fn run_all(&self, tasks: &[SettlementTask]) -> u64 {
        let mut failed = 0;

        for task in tasks {
            let result = self
                .retry
                .run(task.name(), TaskError::is_transient, || self.run(task))
                .await;

            if let Err(error) = result {
                failed += 1;

                error!(
                    task = task.name(),
                    ?task,
                    error = %error,
                    "partial settlement: post-settlement task failed"
                );
            }
        }

        failed
    }
}

/// Post-settlement tasks that exhausted their retries since start-up.
#[derive(Debug, Clone, Default)]
pub struct TaskFailures(Arc<AtomicU64>);

impl TaskFailures {
    #[must_use]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn add(&self, failed: u64) {
        self.0.fetch_add(failed, Ordering::Relaxed);
    }
}

enum QueueMessage {
    Run(SettlementTasks),
    Flush(oneshot::Sender<()>),
}

/// Handle for enqueueing settlement tasks onto the background worker.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    sender: mpsc::Sender<QueueMessage>,
    failures: TaskFailures,
}

impl std::fmt::Debug for QueueMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Run(tasks) => f.debug_tuple("Run").field(tasks).finish(),
            Self::Flush(_) => f.write_str("Flush"),
        }
    }
}

impl TaskQueue {
    /// Spawn the worker that drains the queue until `shutdown` fires.
    #[must_use]
    pub fn spawn(runner: TaskRunner, shutdown: CancellationToken) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<QueueMessage>(QUEUE_CAPACITY);
        let failures = TaskFailures::default();
        let counter = failures.clone();

        let handle = tokio::spawn(async move {
            loop {
                let message = tokio::select! {
                    () = shutdown.cancelled() => break,
                    message = receiver.recv() => message,
                };

                match message {
                    Some(QueueMessage::Run(tasks)) => {
                        counter.add(runner.run_all(&tasks).await);
                    }
                    Some(QueueMessage::Flush(done)) => {
                        let _sent = done.send(());
                    }
                    None => break,
                }
            }

            receiver.close();

            while let Ok(message) = receiver.try_recv() {
                if let QueueMessage::Run(tasks) = message {
                    counter.add(runner.run_all(&tasks).await);
                }
            }

            info!("settlement task worker stopped");
        });

        (Self { sender, failures }, handle)
    }

    /// Queue a purchase's tasks.
    ///
    /// When the worker has stopped, the tasks are logged as failed.
    pub async fn enqueue(&self, tasks: SettlementTasks) {
        if tasks.is_empty() {
            return;
        }

        if let Err(mpsc::error::SendError(QueueMessage::Run(tasks))) =
            self.sender.send(QueueMessage::Run(tasks)).await
        {
            self.failures
                .add(u64::try_from(tasks.len()).unwrap_or(u64::MAX));

            error!(?tasks, "partial settlement: task worker is not running");
        }
    }

    /// Wait until everything queued before this call has run.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();

        if self.sender.send(QueueMessage::Flush(done)).await.is_ok() {
            let _done = wait.await;
        }
    }

    /// Tasks that exhausted their retries since start-up.
    #[must_use]
    pub fn failed_tasks(&self) -> u64 {
        self.failures.get()
    }

    /// Shared handle on the failure count.
    #[must_use]
    pub fn failures(&self) -> TaskFailures {
        self.failures.clone()
    }
}
