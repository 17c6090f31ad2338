//! Checkout Handlers

pub(crate) mod abandon;
pub(crate) mod apply_voucher;
pub(crate) mod begin;
pub(crate) mod card;
pub(crate) mod clear_voucher;
pub(crate) mod internal;
pub(crate) mod nets_events;
pub(crate) mod nets_qr;
pub(crate) mod paypal_capture;
pub(crate) mod paypal_order;
