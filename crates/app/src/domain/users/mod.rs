//! Users

pub mod records;
