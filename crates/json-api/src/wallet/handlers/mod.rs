//! Wallet Handlers

pub(crate) mod auto_convert;
pub(crate) mod confirm_top_up;
pub(crate) mod convert_points;
pub(crate) mod fail_top_up;
pub(crate) mod get;
pub(crate) mod top_up;
pub(crate) mod transactions;
