//! State

use std::sync::Arc;

use storefront_app::context::AppContext;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,

    /// Cancelled on shutdown; long-lived streams watch a child of it.
    pub(crate) shutdown: CancellationToken,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, shutdown: CancellationToken) -> Self {
        Self { app, shutdown }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: AppContext, shutdown: CancellationToken) -> Arc<Self> {
        Arc::new(Self::new(app, shutdown))
    }
}
