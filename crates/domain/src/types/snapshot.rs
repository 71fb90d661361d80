//! Display snapshot: the derived, ephemeral view of what the user sees

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ActivityTypeId, AppColor, FilterId, RunningRecordId, TagId};

/// A running record rendered with its live elapsed duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningEntry {
    pub running_record_id: RunningRecordId,
    pub activity_type_id: ActivityTypeId,
    pub name: String,
    pub icon: String,
    pub color: AppColor,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: i64,
    pub goal_seconds: Option<i64>,
    pub goal_reached: bool,
    pub tag_ids: BTreeSet<TagId>,
    pub comment: Option<String>,
}

/// An activity type offered as a "start" affordance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableEntry {
    pub activity_type_id: ActivityTypeId,
    pub name: String,
    pub icon: String,
    pub color: AppColor,
    pub rank: i64,
    pub requires_tag_selection: bool,
}

/// A filter chip shown alongside the activities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterChip {
    pub filter_id: FilterId,
    pub name: String,
    pub color: AppColor,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayEntry {
    Running(RunningEntry),
    Available(AvailableEntry),
    Filter(FilterChip),
}

/// Ordered view produced by one aggregation.
///
/// Immutable once published; `sequence` is stamped by the publisher and grows
/// with every publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub sequence: u64,
    pub captured_at: DateTime<Utc>,
    pub entries: Vec<DisplayEntry>,
}

impl DisplaySnapshot {
    pub fn new(captured_at: DateTime<Utc>, entries: Vec<DisplayEntry>) -> Self {
        Self { sequence: 0, captured_at, entries }
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn running(&self) -> impl Iterator<Item = &RunningEntry> {
        self.entries.iter().filter_map(|entry| match entry {
            DisplayEntry::Running(running) => Some(running),
            _ => None,
        })
    }

    pub fn available(&self) -> impl Iterator<Item = &AvailableEntry> {
        self.entries.iter().filter_map(|entry| match entry {
            DisplayEntry::Available(available) => Some(available),
            _ => None,
        })
    }

    pub fn filters(&self) -> impl Iterator<Item = &FilterChip> {
        self.entries.iter().filter_map(|entry| match entry {
            DisplayEntry::Filter(chip) => Some(chip),
            _ => None,
        })
    }

    /// Running entry for `type_id`, if that type is running and visible.
    pub fn running_for(&self, type_id: ActivityTypeId) -> Option<&RunningEntry> {
        self.running().find(|entry| entry.activity_type_id == type_id)
    }
}
