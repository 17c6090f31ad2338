//! Purchases

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::PurchasesServiceError;
pub(crate) use repository::PgPurchasesRepository;
pub use service::*;
