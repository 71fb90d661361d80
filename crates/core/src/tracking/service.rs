//! Activity tracking service - core business logic

use std::collections::BTreeSet;
use std::sync::Arc;

use stint_domain::{
    ActivityFilter, ActivityTypeId, DisplaySnapshot, FilterCombination, FilterId,
    NewActivityFilter, Record, RefreshConfig, Result, RunningRecord, RunningRecordId, TagId,
};
use tracing::info;
use uuid::Uuid;

use super::filters::FilterCoordinator;
use super::mediator::{
    PendingTagSelection, RunningRecordMediator, StartOutcome, StartRequest, StopOutcome,
};
use super::ports::{FilterRegistry, RecordStore};
use super::publisher::{SnapshotPublisher, SnapshotSubscription};
use super::refresher::SnapshotRefresher;
use super::scheduler::RefreshScheduler;
use crate::clock::Clock;

/// Tunables for a [`TrackingService`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingOptions {
    pub refresh: RefreshConfig,
    pub combination: FilterCombination,
}

/// Activity tracking service
///
/// Single entry point for the presentation layer: timer start/stop, filter
/// changes, visibility and the snapshot stream.
pub struct TrackingService {
    store: Arc<dyn RecordStore>,
    refresher: Arc<SnapshotRefresher>,
    mediator: RunningRecordMediator,
    filters: FilterCoordinator,
    scheduler: RefreshScheduler,
}

impl TrackingService {
    /// Create a new tracking service
    pub fn new(
        store: Arc<dyn RecordStore>,
        registry: Arc<dyn FilterRegistry>,
        clock: Arc<dyn Clock>,
        options: TrackingOptions,
    ) -> Self {
        let publisher = Arc::new(SnapshotPublisher::new());
        let refresher = Arc::new(SnapshotRefresher::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            Arc::clone(&clock),
            publisher,
            options.combination,
        ));
        let mediator =
            RunningRecordMediator::new(Arc::clone(&store), Arc::clone(&refresher), clock);
        let filters =
            FilterCoordinator::new(Arc::clone(&store), registry, Arc::clone(&refresher));
        let scheduler = RefreshScheduler::new(
            Arc::clone(&refresher),
            options.refresh.interval(),
            options.refresh.join_timeout(),
        );

        Self { store, refresher, mediator, filters, scheduler }
    }

    pub async fn start(&self, type_id: ActivityTypeId, request: StartRequest) -> Result<StartOutcome> {
        self.mediator.start(type_id, request).await
    }

    pub async fn resume_start(&self, token: Uuid, tags: BTreeSet<TagId>) -> Result<RunningRecord> {
        self.mediator.resume_start(token, tags).await
    }

    pub fn cancel_start(&self, token: Uuid) -> Result<PendingTagSelection> {
        self.mediator.cancel_start(token)
    }

    pub fn pending_selections(&self) -> Vec<PendingTagSelection> {
        self.mediator.pending_selections()
    }

    pub async fn stop(&self, running_id: RunningRecordId) -> Result<StopOutcome> {
        self.mediator.stop(running_id).await
    }

    /// Drive the refresh loop from the tracking surface's visibility.
    pub async fn set_visible(&self, visible: bool) {
        self.scheduler.set_visible(visible).await;
    }

    pub async fn is_visible(&self) -> bool {
        self.scheduler.is_active().await
    }

    pub fn subscribe(&self) -> SnapshotSubscription {
        self.refresher.publisher().subscribe()
    }

    pub fn latest_snapshot(&self) -> Option<Arc<DisplaySnapshot>> {
        self.refresher.publisher().latest()
    }

    /// Publish a snapshot now, outside the periodic cadence.
    pub async fn refresh_now(&self) -> Result<Arc<DisplaySnapshot>> {
        self.refresher.refresh().await
    }

    pub async fn toggle_filter(&self, id: FilterId) -> Result<bool> {
        self.filters.toggle_selected(id).await
    }

    pub async fn add_filter(&self, filter: NewActivityFilter) -> Result<ActivityFilter> {
        self.filters.add(filter).await
    }

    pub async fn remove_filter(&self, id: FilterId) -> Result<()> {
        self.filters.remove(id).await
    }

    pub async fn list_records(&self) -> Result<Vec<Record>> {
        self.store.list_records().await
    }

    /// Stop the refresh loop and wait for it to exit.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
        info!("tracking service shut down");
    }
}
