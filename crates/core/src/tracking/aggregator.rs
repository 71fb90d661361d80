//! View aggregation: running records + catalog + filters + now → snapshot
//!
//! Pure and synchronous. The caller captures `now` once and passes it in, so
//! every elapsed duration inside one snapshot is measured against the same
//! instant and identical inputs always give an identical ordering.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use stint_domain::{
    ActivityFilter, ActivityType, ActivityTypeId, AvailableEntry, CategoryId, DisplayEntry,
    DisplaySnapshot, FilterChip, FilterCombination, FilterType, RunningEntry, RunningRecord,
};

/// Everything one aggregation reads.
#[derive(Debug, Clone, Copy)]
pub struct AggregationInput<'a> {
    pub running: &'a [RunningRecord],
    pub types: &'a [ActivityType],
    pub filters: &'a [ActivityFilter],
    pub combination: FilterCombination,
    pub now: DateTime<Utc>,
}

/// Build the ordered display snapshot.
///
/// Order: running entries (most recently started first), then available
/// entries by catalog rank, then filter chips by id. Ties break on the
/// activity type id so the order is total.
pub fn aggregate(input: AggregationInput<'_>) -> DisplaySnapshot {
    let visible = effective_visible_types(input.types, input.filters, input.combination);
    let is_visible = |id: ActivityTypeId| visible.as_ref().map_or(true, |set| set.contains(&id));

    let types_by_id: HashMap<ActivityTypeId, &ActivityType> =
        input.types.iter().map(|activity| (activity.id, activity)).collect();
    let running_types: HashSet<ActivityTypeId> =
        input.running.iter().map(|record| record.activity_type_id).collect();

    let mut running: Vec<(&RunningRecord, &ActivityType)> = input
        .running
        .iter()
        .filter(|record| is_visible(record.activity_type_id))
        .filter_map(|record| {
            types_by_id.get(&record.activity_type_id).map(|activity| (record, *activity))
        })
        .collect();
    running.sort_by(|(a, _), (b, _)| {
        b.started_at.cmp(&a.started_at).then(a.activity_type_id.cmp(&b.activity_type_id))
    });

    let mut available: Vec<&ActivityType> = input
        .types
        .iter()
        .filter(|activity| !activity.archived)
        .filter(|activity| !running_types.contains(&activity.id))
        .filter(|activity| is_visible(activity.id))
        .collect();
    available.sort_by(|a, b| a.rank.cmp(&b.rank).then(a.id.cmp(&b.id)));

    let mut filters: Vec<&ActivityFilter> = input.filters.iter().collect();
    filters.sort_by_key(|filter| filter.id);

    let entries = running
        .into_iter()
        .map(|(record, activity)| DisplayEntry::Running(running_entry(record, activity, input.now)))
        .chain(available.into_iter().map(|activity| DisplayEntry::Available(available_entry(activity))))
        .chain(filters.into_iter().map(|filter| DisplayEntry::Filter(filter_chip(filter))))
        .collect();

    DisplaySnapshot::new(input.now, entries)
}

/// Activity types the selected filters let through.
///
/// `None` means "show all": no filter is selected, or the selected filters
/// contribute nothing. Filters narrow by opting in, they never hide
/// everything by being empty.
pub fn effective_visible_types(
    types: &[ActivityType],
    filters: &[ActivityFilter],
    combination: FilterCombination,
) -> Option<BTreeSet<ActivityTypeId>> {
    let member_sets: Vec<BTreeSet<ActivityTypeId>> = filters
        .iter()
        .filter(|filter| filter.selected && !filter.selected_ids.is_empty())
        .map(|filter| filter_members(filter, types))
        .collect();

    match combination {
        FilterCombination::Union => {
            let union: BTreeSet<ActivityTypeId> = member_sets.into_iter().flatten().collect();
            (!union.is_empty()).then_some(union)
        }
        FilterCombination::Intersection => {
            let mut sets = member_sets.into_iter();
            let first = sets.next()?;
            Some(sets.fold(first, |acc, set| acc.intersection(&set).copied().collect()))
        }
    }
}

fn filter_members(filter: &ActivityFilter, types: &[ActivityType]) -> BTreeSet<ActivityTypeId> {
    match filter.filter_type {
        FilterType::Activity => filter.selected_ids.iter().copied().map(ActivityTypeId).collect(),
        FilterType::Category => {
            let categories: BTreeSet<CategoryId> =
                filter.selected_ids.iter().copied().map(CategoryId).collect();
            types
                .iter()
                .filter(|activity| !activity.category_ids.is_disjoint(&categories))
                .map(|activity| activity.id)
                .collect()
        }
    }
}

fn running_entry(record: &RunningRecord, activity: &ActivityType, now: DateTime<Utc>) -> RunningEntry {
    let elapsed_ms = record.elapsed_at(now).num_milliseconds();
    let goal_reached = activity
        .goal_seconds
        .is_some_and(|goal| goal > 0 && elapsed_ms >= goal.saturating_mul(1000));

    RunningEntry {
        running_record_id: record.id,
        activity_type_id: record.activity_type_id,
        name: activity.name.clone(),
        icon: activity.icon.clone(),
        color: activity.color.clone(),
        started_at: record.started_at,
        elapsed_ms,
        goal_seconds: activity.goal_seconds,
        goal_reached,
        tag_ids: record.tag_ids.clone(),
        comment: record.comment.clone(),
    }
}

fn available_entry(activity: &ActivityType) -> AvailableEntry {
    AvailableEntry {
        activity_type_id: activity.id,
        name: activity.name.clone(),
        icon: activity.icon.clone(),
        color: activity.color.clone(),
        rank: activity.rank,
        requires_tag_selection: activity.requires_tag_selection(),
    }
}

fn filter_chip(filter: &ActivityFilter) -> FilterChip {
    FilterChip {
        filter_id: filter.id,
        name: filter.name.clone(),
        color: filter.color.clone(),
        selected: filter.selected,
    }
}
