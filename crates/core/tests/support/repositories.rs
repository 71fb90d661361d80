//! In-memory port implementations for testing
//!
//! Each store serializes its operations behind one mutex, which gives the
//! same atomicity the SQLite implementations get from transactions. A
//! failure switch lets tests simulate a store outage for the next N calls.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use stint_core::{FilterRegistry, RecordStore};
use stint_domain::{
    ActivityFilter, ActivityType, ActivityTypeId, FilterId, NewActivityFilter, NewRunningRecord,
    Record, RecordId, Result, RunningRecord, RunningRecordId, StintError,
};

#[derive(Default)]
struct FailureSwitch(AtomicUsize);

impl FailureSwitch {
    fn arm(&self, calls: usize) {
        self.0.store(calls, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        let tripped = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if tripped {
            Err(StintError::StoreUnavailable("simulated outage".into()))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct RecordState {
    types: BTreeMap<ActivityTypeId, ActivityType>,
    running: BTreeMap<RunningRecordId, RunningRecord>,
    records: Vec<Record>,
    next_running_id: i64,
    next_record_id: i64,
}

/// In-memory `RecordStore`.
#[derive(Default)]
pub struct InMemoryRecordStore {
    state: Mutex<RecordState>,
    failures: FailureSwitch,
    read_delay_ms: AtomicU64,
}

impl InMemoryRecordStore {
    pub fn with_types(types: Vec<ActivityType>) -> Self {
        let store = Self::default();
        for activity in types {
            store.upsert_type(activity);
        }
        store
    }

    pub fn upsert_type(&self, activity: ActivityType) {
        self.state.lock().types.insert(activity.id, activity);
    }

    /// Fail the next `calls` operations with `StoreUnavailable`.
    pub fn fail_next(&self, calls: usize) {
        self.failures.arm(calls);
    }

    /// Make every `list_running_records` call take `delay` before reading.
    pub fn delay_reads(&self, delay: Duration) {
        self.read_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn running_snapshot(&self) -> Vec<RunningRecord> {
        self.state.lock().running.values().cloned().collect()
    }

    pub fn records_snapshot(&self) -> Vec<Record> {
        self.state.lock().records.clone()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get_type(&self, type_id: ActivityTypeId) -> Result<Option<ActivityType>> {
        self.failures.check()?;
        Ok(self.state.lock().types.get(&type_id).cloned())
    }

    async fn list_types(&self) -> Result<Vec<ActivityType>> {
        self.failures.check()?;
        Ok(self.state.lock().types.values().cloned().collect())
    }

    async fn get_running_record(&self, type_id: ActivityTypeId) -> Result<Option<RunningRecord>> {
        self.failures.check()?;
        Ok(self
            .state
            .lock()
            .running
            .values()
            .find(|record| record.activity_type_id == type_id)
            .cloned())
    }

    async fn list_running_records(&self) -> Result<Vec<RunningRecord>> {
        self.failures.check()?;
        let delay = self.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(self.state.lock().running.values().cloned().collect())
    }

    async fn create_running(&self, record: NewRunningRecord) -> Result<RunningRecordId> {
        self.failures.check()?;
        // Give concurrent starters a chance to interleave before the commit.
        tokio::task::yield_now().await;

        let mut state = self.state.lock();
        if state.running.values().any(|running| running.activity_type_id == record.activity_type_id)
        {
            return Err(StintError::Conflict(format!(
                "running record exists for type {}",
                record.activity_type_id
            )));
        }
        state.next_running_id += 1;
        let id = RunningRecordId(state.next_running_id);
        state.running.insert(id, record.into_running(id));
        Ok(id)
    }

    async fn convert_to_completed(
        &self,
        running_id: RunningRecordId,
        ended_at: DateTime<Utc>,
    ) -> Result<Record> {
        self.failures.check()?;
        let mut state = self.state.lock();
        let running = state
            .running
            .remove(&running_id)
            .ok_or_else(|| StintError::NotFound(format!("running record {running_id}")))?;
        state.next_record_id += 1;
        let record = Record::from_running(RecordId(state.next_record_id), running, ended_at);
        state.records.push(record.clone());
        Ok(record)
    }

    async fn list_records(&self) -> Result<Vec<Record>> {
        self.failures.check()?;
        Ok(self.state.lock().records.clone())
    }
}

#[derive(Default)]
struct FilterState {
    filters: BTreeMap<FilterId, ActivityFilter>,
    next_id: i64,
}

/// In-memory `FilterRegistry`.
#[derive(Default)]
pub struct InMemoryFilterRegistry {
    state: Mutex<FilterState>,
    failures: FailureSwitch,
}

impl InMemoryFilterRegistry {
    pub fn fail_next(&self, calls: usize) {
        self.failures.arm(calls);
    }

    pub fn filters_snapshot(&self) -> Vec<ActivityFilter> {
        self.state.lock().filters.values().cloned().collect()
    }
}

fn missing_filter(id: FilterId) -> StintError {
    StintError::NotFound(format!("activity filter {id}"))
}

#[async_trait]
impl FilterRegistry for InMemoryFilterRegistry {
    async fn list_filters(&self) -> Result<Vec<ActivityFilter>> {
        self.failures.check()?;
        Ok(self.state.lock().filters.values().cloned().collect())
    }

    async fn get_filter(&self, id: FilterId) -> Result<Option<ActivityFilter>> {
        self.failures.check()?;
        Ok(self.state.lock().filters.get(&id).cloned())
    }

    async fn set_selected(&self, id: FilterId, selected: bool) -> Result<()> {
        self.failures.check()?;
        let mut state = self.state.lock();
        let filter = state.filters.get_mut(&id).ok_or_else(|| missing_filter(id))?;
        filter.selected = selected;
        Ok(())
    }

    async fn toggle_selected(&self, id: FilterId) -> Result<bool> {
        self.failures.check()?;
        let mut state = self.state.lock();
        let filter = state.filters.get_mut(&id).ok_or_else(|| missing_filter(id))?;
        filter.selected = !filter.selected;
        Ok(filter.selected)
    }

    async fn add(&self, filter: NewActivityFilter) -> Result<FilterId> {
        self.failures.check()?;
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = FilterId(state.next_id);
        state.filters.insert(id, filter.into_filter(id));
        Ok(id)
    }

    async fn remove(&self, id: FilterId) -> Result<()> {
        self.failures.check()?;
        self.state.lock().filters.remove(&id).map(|_| ()).ok_or_else(|| missing_filter(id))
    }
}
