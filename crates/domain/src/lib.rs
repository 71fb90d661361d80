//! # Stint Domain
//!
//! Business domain types and models for Stint.
//!
//! This crate contains:
//! - Activity catalog, running and completed record types
//! - Activity filters and the derived display snapshot
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Stint crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
