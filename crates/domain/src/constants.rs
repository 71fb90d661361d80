//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

// Refresh loop configuration
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_REFRESH_JOIN_TIMEOUT_MS: u64 = 5000;

// Snapshot stream
pub const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

// Storage defaults
pub const DEFAULT_DB_PATH: &str = "stint.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

// Activity filters
pub const MAX_FILTER_NAME_LENGTH: usize = 80;

/// A type with more selectable tags than this needs the user to pick before
/// a timer can start.
pub const TAG_SELECTION_THRESHOLD: usize = 1;

/// A pending tag selection not resumed within this many seconds is dropped.
pub const PENDING_SELECTION_TTL_SECS: i64 = 600;
