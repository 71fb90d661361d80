//! Port interfaces for activity tracking
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stint_domain::{
    ActivityFilter, ActivityType, ActivityTypeId, FilterId, NewActivityFilter, NewRunningRecord,
    Record, Result, RunningRecord, RunningRecordId,
};

/// Durable store of the activity catalog, running records and completed
/// records.
///
/// The store is the single writer of running and completed rows. Each method
/// is one atomic operation; in particular concurrent `create_running` calls
/// for the same type must be serialized so exactly one succeeds.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up a single catalog entry.
    async fn get_type(&self, type_id: ActivityTypeId) -> Result<Option<ActivityType>>;

    /// Full activity catalog.
    async fn list_types(&self) -> Result<Vec<ActivityType>>;

    /// Running record for an activity type, if one exists.
    async fn get_running_record(&self, type_id: ActivityTypeId) -> Result<Option<RunningRecord>>;

    /// All running records.
    async fn list_running_records(&self) -> Result<Vec<RunningRecord>>;

    /// Persist a new running record.
    ///
    /// Fails with `StintError::Conflict` if the type already has one.
    async fn create_running(&self, record: NewRunningRecord) -> Result<RunningRecordId>;

    /// Atomically replace a running record with its completed record.
    ///
    /// Readers observe either the running row or the completed row, never
    /// both and never neither. Fails with `StintError::NotFound` if the
    /// running record no longer exists.
    async fn convert_to_completed(
        &self,
        running_id: RunningRecordId,
        ended_at: DateTime<Utc>,
    ) -> Result<Record>;

    /// Completed records, oldest first.
    async fn list_records(&self) -> Result<Vec<Record>>;
}

/// Durable store of activity filters.
///
/// Filters are a view-layer overlay: removing one never touches records or
/// the catalog.
#[async_trait]
pub trait FilterRegistry: Send + Sync {
    async fn list_filters(&self) -> Result<Vec<ActivityFilter>>;

    async fn get_filter(&self, id: FilterId) -> Result<Option<ActivityFilter>>;

    /// Set the `selected` flag. Fails with `StintError::NotFound` for an
    /// unknown id.
    async fn set_selected(&self, id: FilterId, selected: bool) -> Result<()>;

    /// Flip the `selected` flag in one atomic step and return the new value.
    async fn toggle_selected(&self, id: FilterId) -> Result<bool>;

    async fn add(&self, filter: NewActivityFilter) -> Result<FilterId>;

    /// Delete a filter. Fails with `StintError::NotFound` for an unknown id.
    async fn remove(&self, id: FilterId) -> Result<()>;
}
