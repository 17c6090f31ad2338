//! Vouchers

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::VouchersServiceError;
pub(crate) use repository::PgVouchersRepository;
pub use service::*;
