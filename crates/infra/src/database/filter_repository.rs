//! SQLite-backed implementation of the `FilterRegistry` port.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use stint_core::FilterRegistry;
use stint_domain::{
    ActivityFilter, AppColor, FilterId, FilterType, NewActivityFilter, Result, StintError,
};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};
use super::rows::{json_column, to_json};

/// SQLite-backed filter registry.
pub struct SqliteFilterRegistry {
    db: Arc<DbManager>,
}

impl SqliteFilterRegistry {
    /// Create a new registry backed by the shared `DbManager`.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

fn missing_filter(id: FilterId) -> StintError {
    StintError::NotFound(format!("activity filter {id}"))
}

#[async_trait]
impl FilterRegistry for SqliteFilterRegistry {
    async fn list_filters(&self) -> Result<Vec<ActivityFilter>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<ActivityFilter>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(FILTER_SELECT_ALL).map_err(map_sql_error)?;
            let rows = stmt.query_map([], map_filter).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_filter(&self, id: FilterId) -> Result<Option<ActivityFilter>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Option<ActivityFilter>> {
            let conn = db.get_connection()?;
            conn.query_row(FILTER_SELECT_BY_ID, params![id.0], map_filter)
                .optional()
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_selected(&self, id: FilterId, selected: bool) -> Result<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE activity_filters SET selected = ?1 WHERE id = ?2",
                    params![selected, id.0],
                )
                .map_err(map_sql_error)?;
            if changed == 0 {
                return Err(missing_filter(id));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn toggle_selected(&self, id: FilterId) -> Result<bool> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<bool> {
            let conn = db.get_connection()?;
            conn.query_row(
                "UPDATE activity_filters SET selected = NOT selected WHERE id = ?1 RETURNING selected",
                params![id.0],
                |row| row.get::<_, bool>(0),
            )
            .optional()
            .map_err(map_sql_error)?
            .ok_or_else(|| missing_filter(id))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn add(&self, filter: NewActivityFilter) -> Result<FilterId> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<FilterId> {
            let conn = db.get_connection()?;
            let members = to_json(&filter.selected_ids)?;
            conn.execute(
                INSERT_FILTER_SQL,
                params![
                    filter.name,
                    filter.filter_type.to_string(),
                    members,
                    filter.selected,
                    filter.color.color_id,
                    filter.color.color_int,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(FilterId(conn.last_insert_rowid()))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn remove(&self, id: FilterId) -> Result<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let removed = conn
                .execute("DELETE FROM activity_filters WHERE id = ?1", params![id.0])
                .map_err(map_sql_error)?;
            if removed == 0 {
                return Err(missing_filter(id));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

const INSERT_FILTER_SQL: &str = "INSERT INTO activity_filters (
        name, filter_type, selected_ids, selected, color_id, color_int
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const FILTER_SELECT_ALL: &str = "SELECT id, name, filter_type, selected_ids, selected, color_id,
        color_int
    FROM activity_filters ORDER BY id";

const FILTER_SELECT_BY_ID: &str = "SELECT id, name, filter_type, selected_ids, selected, color_id,
        color_int
    FROM activity_filters WHERE id = ?1";

fn map_filter(row: &Row<'_>) -> rusqlite::Result<ActivityFilter> {
    let filter_type: String = row.get(2)?;
    let filter_type = filter_type
        .parse::<FilterType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into()))?;

    Ok(ActivityFilter {
        id: FilterId(row.get(0)?),
        name: row.get(1)?,
        filter_type,
        selected_ids: json_column(row, 3)?,
        selected: row.get(4)?,
        color: AppColor { color_id: row.get(5)?, color_int: row.get(6)? },
    })
}
