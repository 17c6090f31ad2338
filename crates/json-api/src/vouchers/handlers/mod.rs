//! Voucher Handlers

pub(crate) mod admin_create;
pub(crate) mod admin_delete;
pub(crate) mod admin_index;
pub(crate) mod admin_update;
pub(crate) mod claim;
pub(crate) mod claims;
pub(crate) mod index;
