//! CLI command implementations

pub mod account;
pub mod export;
pub mod generate;
pub mod providers;
pub mod recipe;
