//! Domain types and models

pub mod activity;
pub mod filter;
pub mod snapshot;

use serde::{Deserialize, Serialize};

pub use activity::{ActivityType, NewRunningRecord, Record, RunningRecord};
pub use filter::{ActivityFilter, FilterCombination, FilterType, NewActivityFilter};
pub use snapshot::{AvailableEntry, DisplayEntry, DisplaySnapshot, FilterChip, RunningEntry};

/// Declares an integer-backed identifier newtype.
///
/// Ids are referenced across aggregates but never embedded by value, so each
/// kind gets its own type to keep a filter id from being passed where an
/// activity type id is expected.
macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(
    /// Identifier of an [`ActivityType`] catalog entry.
    ActivityTypeId
);
id_newtype!(
    /// Identifier of a [`RunningRecord`].
    RunningRecordId
);
id_newtype!(
    /// Identifier of a completed [`Record`].
    RecordId
);
id_newtype!(
    /// Identifier of an [`ActivityFilter`].
    FilterId
);
id_newtype!(
    /// Identifier of a record tag (sub-classification attached to a record).
    TagId
);
id_newtype!(
    /// Identifier of an activity category.
    CategoryId
);

/// Display color as stored by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppColor {
    /// Index into the palette.
    pub color_id: i32,
    /// Custom color override (hex), empty when the palette color applies.
    pub color_int: String,
}

impl AppColor {
    pub fn palette(color_id: i32) -> Self {
        Self { color_id, color_int: String::new() }
    }
}
