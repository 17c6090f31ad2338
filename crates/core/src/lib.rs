//! Storefront
//!
//! Pricing, voucher, wallet and refund rules for the storefront checkout. Everything in this
//! crate is pure computation over [`rusty_money::Money`] values; persistence and payment
//! gateways live in the application crate.

pub mod allocation;
pub mod cards;
pub mod cart;
pub mod money;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod refunds;
pub mod vouchers;
pub mod wallet;
