//! Activity filters: named selection sets applied to the dashboard

use serde::{Deserialize, Serialize};

use super::{AppColor, FilterId};
use crate::impl_domain_status_conversions;

/// What the member ids of a filter refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Members are activity type ids.
    Activity,
    /// Members are category ids; every type in any listed category matches.
    Category,
}

impl_domain_status_conversions!(FilterType {
    Activity => "activity",
    Category => "category",
});

/// How several simultaneously selected filters combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCombination {
    /// A type is visible if any selected filter matches it.
    #[default]
    Union,
    /// A type is visible only if every selected, non-empty filter matches it.
    Intersection,
}

impl_domain_status_conversions!(FilterCombination {
    Union => "union",
    Intersection => "intersection",
});

/// Persisted filter row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFilter {
    pub id: FilterId,
    pub name: String,
    pub filter_type: FilterType,
    /// Ordered member ids, interpreted according to `filter_type`.
    pub selected_ids: Vec<i64>,
    /// Whether the filter is currently applied to the dashboard.
    pub selected: bool,
    pub color: AppColor,
}

/// Filter input before the registry assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivityFilter {
    pub name: String,
    pub filter_type: FilterType,
    pub selected_ids: Vec<i64>,
    pub selected: bool,
    pub color: AppColor,
}

impl NewActivityFilter {
    pub fn into_filter(self, id: FilterId) -> ActivityFilter {
        ActivityFilter {
            id,
            name: self.name,
            filter_type: self.filter_type,
            selected_ids: self.selected_ids,
            selected: self.selected,
            color: self.color,
        }
    }
}
