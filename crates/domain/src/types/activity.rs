//! Activity catalog, running records and completed records

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{ActivityTypeId, AppColor, CategoryId, RecordId, RunningRecordId, TagId};
use crate::constants::TAG_SELECTION_THRESHOLD;

/// Catalog entry describing something a user can time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityType {
    pub id: ActivityTypeId,
    pub name: String,
    pub icon: String,
    pub color: AppColor,
    /// Daily goal in seconds, if the user set one.
    pub goal_seconds: Option<i64>,
    /// Catalog ordering rank (ascending).
    pub rank: i64,
    /// Archived types are not offered for starting.
    #[serde(default)]
    pub archived: bool,
    /// Tags the user may attach when starting this activity.
    #[serde(default)]
    pub selectable_tag_ids: BTreeSet<TagId>,
    /// Categories this activity belongs to.
    #[serde(default)]
    pub category_ids: BTreeSet<CategoryId>,
}

impl ActivityType {
    /// Minimal catalog entry; remaining fields take neutral defaults.
    pub fn new(id: ActivityTypeId, name: impl Into<String>, rank: i64) -> Self {
        Self {
            id,
            name: name.into(),
            icon: String::new(),
            color: AppColor::default(),
            goal_seconds: None,
            rank,
            archived: false,
            selectable_tag_ids: BTreeSet::new(),
            category_ids: BTreeSet::new(),
        }
    }

    /// Starting this type needs the user to pick tags first.
    pub fn requires_tag_selection(&self) -> bool {
        self.selectable_tag_ids.len() > TAG_SELECTION_THRESHOLD
    }

    /// Whether every id in `tags` is selectable for this type.
    pub fn accepts_tags(&self, tags: &BTreeSet<TagId>) -> bool {
        tags.is_subset(&self.selectable_tag_ids)
    }
}

/// An activity currently being timed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningRecord {
    pub id: RunningRecordId,
    pub activity_type_id: ActivityTypeId,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub tag_ids: BTreeSet<TagId>,
    pub comment: Option<String>,
}

impl RunningRecord {
    /// Elapsed time at `now`; a start in the future (clock skew) reads as zero.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).max(Duration::zero())
    }
}

/// Running record before the store assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRunningRecord {
    pub activity_type_id: ActivityTypeId,
    pub started_at: DateTime<Utc>,
    pub tag_ids: BTreeSet<TagId>,
    pub comment: Option<String>,
}

impl NewRunningRecord {
    pub fn into_running(self, id: RunningRecordId) -> RunningRecord {
        RunningRecord {
            id,
            activity_type_id: self.activity_type_id,
            started_at: self.started_at,
            tag_ids: self.tag_ids,
            comment: self.comment,
        }
    }
}

/// Completed time record produced when a running record is stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub activity_type_id: ActivityTypeId,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    #[serde(default)]
    pub tag_ids: BTreeSet<TagId>,
    pub comment: Option<String>,
}

impl Record {
    /// Build the completed record for `running` ending at `ended_at`.
    ///
    /// An end before the start (clock skew) is clamped to the start.
    pub fn from_running(id: RecordId, running: RunningRecord, ended_at: DateTime<Utc>) -> Self {
        Self {
            id,
            activity_type_id: running.activity_type_id,
            started_at: running.started_at,
            ended_at: ended_at.max(running.started_at),
            tag_ids: running.tag_ids,
            comment: running.comment,
        }
    }

    pub fn duration(&self) -> Duration {
        self.ended_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn tags(ids: &[i64]) -> BTreeSet<TagId> {
        ids.iter().copied().map(TagId).collect()
    }

    #[test]
    fn tag_selection_required_only_with_several_tags() {
        let mut work = ActivityType::new(ActivityTypeId(1), "Work", 0);
        assert!(!work.requires_tag_selection());

        work.selectable_tag_ids = tags(&[10]);
        assert!(!work.requires_tag_selection());

        work.selectable_tag_ids = tags(&[10, 11]);
        assert!(work.requires_tag_selection());
        assert!(work.accepts_tags(&tags(&[11])));
        assert!(work.accepts_tags(&tags(&[])));
        assert!(!work.accepts_tags(&tags(&[12])));
    }

    #[test]
    fn elapsed_never_negative() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let running = RunningRecord {
            id: RunningRecordId(1),
            activity_type_id: ActivityTypeId(1),
            started_at: start,
            tag_ids: BTreeSet::new(),
            comment: None,
        };

        assert_eq!(running.elapsed_at(start + Duration::seconds(90)), Duration::seconds(90));
        assert_eq!(running.elapsed_at(start - Duration::seconds(5)), Duration::zero());
    }

    #[test]
    fn completed_record_carries_tags_and_comment() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let running = RunningRecord {
            id: RunningRecordId(3),
            activity_type_id: ActivityTypeId(7),
            started_at: start,
            tag_ids: tags(&[4]),
            comment: Some("deep work".into()),
        };

        let record = Record::from_running(RecordId(9), running, start + Duration::minutes(25));
        assert_eq!(record.activity_type_id, ActivityTypeId(7));
        assert_eq!(record.tag_ids, tags(&[4]));
        assert_eq!(record.comment.as_deref(), Some("deep work"));
        assert_eq!(record.duration(), Duration::minutes(25));
    }

    #[test]
    fn end_before_start_is_clamped() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let running = RunningRecord {
            id: RunningRecordId(1),
            activity_type_id: ActivityTypeId(1),
            started_at: start,
            tag_ids: BTreeSet::new(),
            comment: None,
        };

        let record = Record::from_running(RecordId(1), running, start - Duration::seconds(3));
        assert_eq!(record.ended_at, start);
        assert_eq!(record.duration(), Duration::zero());
    }
}
