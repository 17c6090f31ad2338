//! Storefront application services: persistence, payment gateways and checkout settlement.

pub mod checkout;
pub mod context;
pub mod database;
pub mod domain;
pub mod gateways;

#[cfg(test)]
mod test;

mod uuids;
