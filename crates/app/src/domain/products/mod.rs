//! Products

pub mod records;
