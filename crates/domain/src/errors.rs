//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Stint
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum StintError {
    /// An id referenced an activity type, record or filter that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A running record already exists for the activity type.
    #[error("Already running: {0}")]
    AlreadyRunning(String),

    /// Malformed filter or type input. Never mutates state.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The record store or filter registry could not be reached.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Store-level uniqueness violation (a second running record for a type).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StintError {
    /// Whether the failure is a collaborator blip that a retry may clear.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// Stable label suitable for logging and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadyRunning(_) => "already_running",
            Self::Validation(_) => "validation",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Conflict(_) => "conflict",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for Stint operations
pub type Result<T> = std::result::Result<T, StintError>;
