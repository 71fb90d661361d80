//! Shared test helpers for `stint-core` integration tests.
//!
//! In-memory port implementations and clocks so the tracking tests can focus
//! on behaviour instead of storage.

#![allow(dead_code)]

pub mod repositories;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use stint_core::{Clock, TrackingOptions, TrackingService};
use stint_domain::{ActivityType, ActivityTypeId, FilterCombination, RefreshConfig, TagId};
use tokio::time::Instant;

pub use repositories::{InMemoryFilterRegistry, InMemoryRecordStore};

/// Fixed origin for all test timestamps.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
}

/// Clock that follows tokio's (possibly paused) timer.
///
/// With `start_paused = true`, wall time moves exactly as far as tokio's
/// auto-advance does, so elapsed values line up with the refresh cadence.
pub struct TokioClock {
    base: DateTime<Utc>,
    origin: Instant,
}

impl TokioClock {
    pub fn new(base: DateTime<Utc>) -> Self {
        Self { base, origin: Instant::now() }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = Instant::now().duration_since(self.origin);
        self.base + chrono::Duration::from_std(elapsed).unwrap()
    }
}

pub fn activity(id: i64, name: &str, rank: i64) -> ActivityType {
    ActivityType::new(ActivityTypeId(id), name, rank)
}

pub fn tagged_activity(id: i64, name: &str, tags: &[i64]) -> ActivityType {
    let mut activity = activity(id, name, id);
    activity.selectable_tag_ids = tags.iter().copied().map(TagId).collect();
    activity
}

pub fn options(interval_ms: u64) -> TrackingOptions {
    TrackingOptions {
        refresh: RefreshConfig { interval_ms, join_timeout_ms: 1_000 },
        combination: FilterCombination::Union,
    }
}

/// Everything a tracking test needs, with handles to the in-memory ports.
pub struct Harness {
    pub service: Arc<TrackingService>,
    pub store: Arc<InMemoryRecordStore>,
    pub registry: Arc<InMemoryFilterRegistry>,
}

pub fn harness_with_clock(
    types: Vec<ActivityType>,
    clock: Arc<dyn Clock>,
    options: TrackingOptions,
) -> Harness {
    let store = Arc::new(InMemoryRecordStore::with_types(types));
    let registry = Arc::new(InMemoryFilterRegistry::default());
    let service = Arc::new(TrackingService::new(
        store.clone(),
        registry.clone(),
        clock,
        options,
    ));
    Harness { service, store, registry }
}

pub fn harness(types: Vec<ActivityType>) -> Harness {
    harness_with_clock(types, Arc::new(TokioClock::new(epoch())), options(1_000))
}

/// Let spawned tasks run without moving paused time.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

pub const INTERVAL: Duration = Duration::from_millis(1_000);

/// Route tracing output through the test harness; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("stint_core=debug"))
        .with_test_writer()
        .try_init();
}
