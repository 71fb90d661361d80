//! Running-activity tracking: start/stop transitions, filters and the
//! periodically refreshed display snapshot.

pub mod aggregator;
pub mod filters;
pub mod mediator;
pub mod ports;
pub mod publisher;
pub mod refresher;
pub mod scheduler;
pub mod service;

pub use service::TrackingService;
