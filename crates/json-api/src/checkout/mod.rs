//! Checkout

mod errors;
pub(crate) mod handlers;
mod outcome;
pub(crate) mod responses;

pub(crate) use errors::into_status_error;
pub(crate) use handlers::*;
pub(crate) use outcome::settlement_response;
