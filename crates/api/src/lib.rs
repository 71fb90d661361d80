//! # Stint API
//!
//! Application layer - commands and main entry point.
//!
//! This crate contains:
//! - Commands used by a presentation surface (timer, visibility, filters)
//! - Application context (dependency injection)
//! - Logging initialisation
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
