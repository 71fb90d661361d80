//! Filter mutations that keep the display snapshot in step

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use stint_domain::constants::MAX_FILTER_NAME_LENGTH;
use stint_domain::{
    ActivityFilter, CategoryId, FilterId, FilterType, NewActivityFilter, Result, StintError,
};
use tracing::{info, instrument, warn};

use super::ports::{FilterRegistry, RecordStore};
use super::refresher::SnapshotRefresher;

pub struct FilterCoordinator {
    store: Arc<dyn RecordStore>,
    registry: Arc<dyn FilterRegistry>,
    refresher: Arc<SnapshotRefresher>,
}

impl FilterCoordinator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        registry: Arc<dyn FilterRegistry>,
        refresher: Arc<SnapshotRefresher>,
    ) -> Self {
        Self { store, registry, refresher }
    }

    /// Flip a filter's `selected` flag; returns the new value.
    #[instrument(skip(self), fields(filter_id = %id))]
    pub async fn toggle_selected(&self, id: FilterId) -> Result<bool> {
        let selected = self.registry.toggle_selected(id).await?;
        info!(selected, "filter toggled");
        self.publish_after_mutation().await;
        Ok(selected)
    }

    /// Remove a filter. Records and the catalog are untouched.
    ///
    /// An unknown id is `NotFound` and publishes nothing.
    #[instrument(skip(self), fields(filter_id = %id))]
    pub async fn remove(&self, id: FilterId) -> Result<()> {
        let filter = self
            .registry
            .get_filter(id)
            .await?
            .ok_or_else(|| StintError::NotFound(format!("activity filter {id}")))?;
        self.registry.remove(id).await?;
        info!(name = %filter.name, was_selected = filter.selected, "filter removed");
        self.publish_after_mutation().await;
        Ok(())
    }

    /// Validate and persist a new filter.
    ///
    /// The name is trimmed and member ids are de-duplicated keeping their
    /// first position. Every member must refer to something in the catalog.
    /// Nothing is written when validation fails.
    #[instrument(skip(self, filter), fields(name = %filter.name))]
    pub async fn add(&self, filter: NewActivityFilter) -> Result<ActivityFilter> {
        let filter = self.validate(filter).await?;
        let id = self.registry.add(filter.clone()).await?;
        info!(filter_id = %id, members = filter.selected_ids.len(), "filter added");
        self.publish_after_mutation().await;
        Ok(filter.into_filter(id))
    }

    async fn validate(&self, mut filter: NewActivityFilter) -> Result<NewActivityFilter> {
        let name = filter.name.trim();
        if name.is_empty() {
            return Err(StintError::Validation("filter name must not be empty".into()));
        }
        if name.chars().count() > MAX_FILTER_NAME_LENGTH {
            return Err(StintError::Validation(format!(
                "filter name exceeds {MAX_FILTER_NAME_LENGTH} characters"
            )));
        }
        filter.name = name.to_string();

        let mut seen = HashSet::new();
        filter.selected_ids.retain(|id| seen.insert(*id));
        if filter.selected_ids.is_empty() {
            return Ok(filter);
        }

        let types = self.store.list_types().await?;
        let known: BTreeSet<i64> = match filter.filter_type {
            FilterType::Activity => types.iter().map(|activity| activity.id.0).collect(),
            FilterType::Category => types
                .iter()
                .flat_map(|activity| activity.category_ids.iter().map(|CategoryId(id)| *id))
                .collect(),
        };

        let unknown: Vec<String> = filter
            .selected_ids
            .iter()
            .filter(|id| !known.contains(id))
            .map(ToString::to_string)
            .collect();
        if !unknown.is_empty() {
            return Err(StintError::Validation(format!(
                "unknown {} ids: {}",
                filter.filter_type,
                unknown.join(", ")
            )));
        }
        Ok(filter)
    }

    async fn publish_after_mutation(&self) {
        if let Err(e) = self.refresher.refresh().await {
            warn!(error = %e, "refresh after filter change failed");
        }
    }
}
