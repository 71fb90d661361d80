//! # Stint Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (record store, filter registry, clock)
//! - The running-record mediator (start/stop transitions)
//! - The view aggregator and snapshot publisher
//! - The refresh scheduler driving periodic snapshots
//! - Activity filter coordination
//!
//! ## Architecture Principles
//! - Only depends on `stint-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod clock;
pub mod tracking;

pub use clock::{Clock, MockClock, SystemClock};
pub use tracking::aggregator::{aggregate, effective_visible_types, AggregationInput};
pub use tracking::filters::FilterCoordinator;
pub use tracking::mediator::{
    PendingTagSelection, RunningRecordMediator, StartOutcome, StartRequest, StopOutcome,
};
pub use tracking::ports::{FilterRegistry, RecordStore};
pub use tracking::publisher::{ReadTicket, SnapshotPublisher, SnapshotSubscription};
pub use tracking::refresher::SnapshotRefresher;
pub use tracking::scheduler::{RefreshScheduler, RefreshState};
pub use tracking::service::{TrackingOptions, TrackingService};
