//! Start/stop transitions for running records
//!
//! Starting an activity that needs tags is a two-phase protocol: `start`
//! parks the request as a [`PendingTagSelection`] and hands back its token;
//! the caller later completes it with `resume_start` or drops it with
//! `cancel_start`. Nothing is written until the request commits. Tokens not
//! used within [`PENDING_SELECTION_TTL_SECS`] expire.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use stint_domain::constants::PENDING_SELECTION_TTL_SECS;
use stint_domain::{
    ActivityType, ActivityTypeId, NewRunningRecord, Record, Result, RunningRecord,
    RunningRecordId, StintError, TagId,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::ports::RecordStore;
use super::refresher::SnapshotRefresher;
use crate::clock::Clock;

/// Caller-supplied start options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartRequest {
    /// `None` means "not decided yet"; `Some(empty)` means "no tags".
    pub tags: Option<BTreeSet<TagId>>,
    pub comment: Option<String>,
}

impl StartRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.tags = Some(tags.into_iter().collect());
        self
    }

    pub fn without_tags(mut self) -> Self {
        self.tags = Some(BTreeSet::new());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// A start waiting on the user's tag choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingTagSelection {
    pub token: Uuid,
    pub activity_type_id: ActivityTypeId,
    /// Tags the user can choose from.
    pub selectable_tag_ids: BTreeSet<TagId>,
    pub comment: Option<String>,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started(RunningRecord),
    PendingTagSelection(PendingTagSelection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped(Record),
    /// The running record was already gone, usually a lost race with
    /// another stop.
    NotFound,
}

pub struct RunningRecordMediator {
    store: Arc<dyn RecordStore>,
    refresher: Arc<SnapshotRefresher>,
    clock: Arc<dyn Clock>,
    pending: Mutex<HashMap<Uuid, PendingTagSelection>>,
}

impl RunningRecordMediator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        refresher: Arc<SnapshotRefresher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, refresher, clock, pending: Mutex::new(HashMap::new()) }
    }

    /// Start timing an activity type.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown or archived type, `AlreadyRunning` when the
    /// type already has a running record, `Validation` for tags the type
    /// does not offer, `StoreUnavailable` when the store fails.
    #[instrument(skip(self, request), fields(activity_type_id = %type_id))]
    pub async fn start(&self, type_id: ActivityTypeId, request: StartRequest) -> Result<StartOutcome> {
        let activity = self.startable_type(type_id).await?;
        self.ensure_not_running(type_id).await?;

        let Some(tags) = request.tags else {
            if activity.requires_tag_selection() {
                let now = self.clock.now();
                let pending = PendingTagSelection {
                    token: Uuid::new_v4(),
                    activity_type_id: type_id,
                    selectable_tag_ids: activity.selectable_tag_ids.clone(),
                    comment: request.comment,
                    requested_at: now,
                };
                {
                    let mut table = self.pending.lock();
                    purge_expired(&mut table, now);
                    table.insert(pending.token, pending.clone());
                }
                info!(token = %pending.token, "start awaiting tag selection");
                return Ok(StartOutcome::PendingTagSelection(pending));
            }
            let record = self.commit(&activity, BTreeSet::new(), request.comment).await?;
            return Ok(StartOutcome::Started(record));
        };

        validate_tags(&activity, &tags)?;
        let record = self.commit(&activity, tags, request.comment).await?;
        Ok(StartOutcome::Started(record))
    }

    /// Complete a pending start with the chosen tags (possibly none).
    ///
    /// A validation failure leaves the token usable so the caller can retry
    /// with a corrected choice; any other outcome consumes it. An expired
    /// token is `NotFound`.
    #[instrument(skip(self, tags))]
    pub async fn resume_start(&self, token: Uuid, tags: BTreeSet<TagId>) -> Result<RunningRecord> {
        let pending = {
            let mut table = self.pending.lock();
            purge_expired(&mut table, self.clock.now());
            let found = table.get(&token).cloned();
            found
        }
        .ok_or_else(|| StintError::NotFound(format!("pending start {token}")))?;

        let activity = match self.startable_type(pending.activity_type_id).await {
            Ok(activity) => activity,
            Err(e) => {
                if matches!(e, StintError::NotFound(_)) {
                    self.pending.lock().remove(&token);
                }
                return Err(e);
            }
        };
        validate_tags(&activity, &tags)?;

        if self.pending.lock().remove(&token).is_none() {
            return Err(StintError::NotFound(format!("pending start {token}")));
        }
        self.commit(&activity, tags, pending.comment).await
    }

    /// Discard a pending start. Nothing was written, so nothing is undone.
    pub fn cancel_start(&self, token: Uuid) -> Result<PendingTagSelection> {
        let removed = {
            let mut table = self.pending.lock();
            purge_expired(&mut table, self.clock.now());
            table.remove(&token)
        };
        let pending =
            removed.ok_or_else(|| StintError::NotFound(format!("pending start {token}")))?;
        info!(%token, activity_type_id = %pending.activity_type_id, "pending start cancelled");
        Ok(pending)
    }

    /// Outstanding tag selections, oldest first.
    pub fn pending_selections(&self) -> Vec<PendingTagSelection> {
        let mut table = self.pending.lock();
        purge_expired(&mut table, self.clock.now());
        let mut pending: Vec<_> = table.values().cloned().collect();
        drop(table);
        pending.sort_by(|a, b| a.requested_at.cmp(&b.requested_at).then(a.token.cmp(&b.token)));
        pending
    }

    /// Stop a running record and persist its completed record.
    ///
    /// A record that is already gone is reported as [`StopOutcome::NotFound`]
    /// rather than an error.
    #[instrument(skip(self), fields(running_record_id = %running_id))]
    pub async fn stop(&self, running_id: RunningRecordId) -> Result<StopOutcome> {
        let ended_at = self.clock.now();
        match self.store.convert_to_completed(running_id, ended_at).await {
            Ok(record) => {
                info!(
                    record_id = %record.id,
                    duration_ms = record.duration().num_milliseconds(),
                    "running record stopped"
                );
                self.publish_after_mutation().await;
                Ok(StopOutcome::Stopped(record))
            }
            Err(StintError::NotFound(detail)) => {
                debug!(%detail, "stop ignored; running record already gone");
                Ok(StopOutcome::NotFound)
            }
            Err(e) => Err(e),
        }
    }

    async fn startable_type(&self, type_id: ActivityTypeId) -> Result<ActivityType> {
        match self.store.get_type(type_id).await? {
            Some(activity) if !activity.archived => Ok(activity),
            Some(_) => Err(StintError::NotFound(format!("activity type {type_id} is archived"))),
            None => Err(StintError::NotFound(format!("activity type {type_id}"))),
        }
    }

    async fn ensure_not_running(&self, type_id: ActivityTypeId) -> Result<()> {
        match self.store.get_running_record(type_id).await? {
            Some(running) => Err(already_running(type_id, Some(running.id))),
            None => Ok(()),
        }
    }

    async fn commit(
        &self,
        activity: &ActivityType,
        tags: BTreeSet<TagId>,
        comment: Option<String>,
    ) -> Result<RunningRecord> {
        let new_record = NewRunningRecord {
            activity_type_id: activity.id,
            started_at: self.clock.now(),
            tag_ids: tags,
            comment,
        };

        let id = match self.store.create_running(new_record.clone()).await {
            Ok(id) => id,
            Err(StintError::Conflict(_)) => return Err(already_running(activity.id, None)),
            Err(e) => return Err(e),
        };

        let record = new_record.into_running(id);
        info!(running_record_id = %id, activity_type_id = %activity.id, "running record started");
        self.publish_after_mutation().await;
        Ok(record)
    }

    /// The mutation is durable at this point; a failed refresh only delays
    /// the view until the next one.
    async fn publish_after_mutation(&self) {
        if let Err(e) = self.refresher.refresh().await {
            warn!(error = %e, "refresh after mutation failed");
        }
    }
}

fn purge_expired(table: &mut HashMap<Uuid, PendingTagSelection>, now: DateTime<Utc>) {
    let ttl = Duration::seconds(PENDING_SELECTION_TTL_SECS);
    let before = table.len();
    table.retain(|_, pending| now - pending.requested_at < ttl);
    let expired = before - table.len();
    if expired > 0 {
        debug!(expired, "pending tag selections expired");
    }
}

fn validate_tags(activity: &ActivityType, tags: &BTreeSet<TagId>) -> Result<()> {
    if activity.accepts_tags(tags) {
        return Ok(());
    }
    let unknown: Vec<String> = tags
        .difference(&activity.selectable_tag_ids)
        .map(ToString::to_string)
        .collect();
    Err(StintError::Validation(format!(
        "tags [{}] are not selectable for activity type {}",
        unknown.join(", "),
        activity.id
    )))
}

fn already_running(type_id: ActivityTypeId, running_id: Option<RunningRecordId>) -> StintError {
    match running_id {
        Some(id) => StintError::AlreadyRunning(format!("activity type {type_id} (running record {id})")),
        None => StintError::AlreadyRunning(format!("activity type {type_id}")),
    }
}
