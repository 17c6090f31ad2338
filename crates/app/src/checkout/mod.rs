//! Checkout
//!
//! Pricing snapshots, payment flows and settlement. A checkout begins with a session holding
//! the priced cart and its allocation across instruments; every payment flow ends in
//! [`settlement::Settler::settle`].

pub mod errors;
pub mod flow;
pub mod qr;
pub mod service;
pub mod session;
pub mod settlement;
pub mod tasks;

pub use errors::CheckoutError;
pub use service::*;
