//! Storefront Domain Concerns

pub mod carts;
pub mod products;
pub mod purchases;
pub mod refunds;
pub mod users;
pub mod vouchers;
pub mod wallets;
