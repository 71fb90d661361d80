//! Database implementations

pub mod filter_repository;
pub mod manager;
pub mod record_store;
mod rows;

pub use filter_repository::*;
pub use manager::*;
pub use record_store::*;
