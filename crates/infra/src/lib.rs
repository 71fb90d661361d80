//! # Stint Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite-backed record store and filter registry
//! - Connection pool management and schema migrations
//! - Conversions from storage errors into domain errors
//! - Configuration loading from the environment and files
//!
//! ## Architecture
//! - Implements traits defined in `stint-core`
//! - Contains all "impure" code (I/O, filesystem)

pub mod config;
pub mod database;
pub mod errors;

// Re-export commonly used items
pub use database::*;
pub use errors::InfraError;
