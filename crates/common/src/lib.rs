//! Ambient utilities shared by the product service crates.

pub mod types;
pub mod utils;
