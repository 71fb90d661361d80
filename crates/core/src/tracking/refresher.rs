//! Read current state, aggregate, publish

use std::sync::Arc;

use stint_domain::{DisplaySnapshot, FilterCombination, Result};
use tracing::{debug, instrument};

use super::aggregator::{aggregate, AggregationInput};
use super::ports::{FilterRegistry, RecordStore};
use super::publisher::SnapshotPublisher;
use crate::clock::Clock;

/// Produces one snapshot per call.
///
/// Shared by the periodic loop and by mutations that want the view updated
/// right away. Refreshes run concurrently; the publisher keeps only the
/// snapshot from the newest read, so no lock is held around store access.
pub struct SnapshotRefresher {
    store: Arc<dyn RecordStore>,
    registry: Arc<dyn FilterRegistry>,
    clock: Arc<dyn Clock>,
    publisher: Arc<SnapshotPublisher>,
    combination: FilterCombination,
}

impl SnapshotRefresher {
    pub fn new(
        store: Arc<dyn RecordStore>,
        registry: Arc<dyn FilterRegistry>,
        clock: Arc<dyn Clock>,
        publisher: Arc<SnapshotPublisher>,
        combination: FilterCombination,
    ) -> Self {
        Self { store, registry, clock, publisher, combination }
    }

    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Arc<DisplaySnapshot>> {
        let ticket = self.publisher.begin_read();
        let (running, types, filters) = tokio::try_join!(
            self.store.list_running_records(),
            self.store.list_types(),
            self.registry.list_filters(),
        )?;
        let now = self.clock.now();

        let snapshot = aggregate(AggregationInput {
            running: &running,
            types: &types,
            filters: &filters,
            combination: self.combination,
            now,
        });
        let published = self.publisher.publish_read(ticket, snapshot);
        debug!(
            sequence = published.sequence,
            entries = published.entries.len(),
            "display snapshot published"
        );
        Ok(published)
    }

    pub fn publisher(&self) -> &Arc<SnapshotPublisher> {
        &self.publisher
    }

    pub fn combination(&self) -> FilterCombination {
        self.combination
    }
}
