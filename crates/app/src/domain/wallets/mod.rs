//! Wallets
//!
//! E-wallet balance, loyalty points and store credit, with an append-only log of every movement.

pub mod data;
pub mod errors;
pub(crate) mod ledger;
pub mod records;
mod repository;
pub mod service;

pub use errors::WalletsServiceError;
pub use service::*;
