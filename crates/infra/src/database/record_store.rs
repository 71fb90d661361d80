//! SQLite-backed implementation of the `RecordStore` port.
//!
//! Owns the activity catalog, running records and completed records. Every
//! call runs on the blocking pool; stopping a record is one IMMEDIATE
//! transaction so readers never see it both running and completed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};
use stint_core::RecordStore;
use stint_domain::{
    ActivityType, ActivityTypeId, AppColor, NewRunningRecord, Record, RecordId, Result,
    RunningRecord, RunningRecordId, StintError,
};
use tokio::task;
use tracing::debug;

use super::manager::{map_join_error, map_sql_error, DbManager};
use super::rows::{json_column, timestamp_column, to_json};

/// SQLite-backed record store.
pub struct SqliteRecordStore {
    db: Arc<DbManager>,
}

impl SqliteRecordStore {
    /// Create a new store backed by the shared `DbManager`.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or replace a catalog entry.
    pub async fn upsert_type(&self, activity: ActivityType) -> Result<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let tags = to_json(&activity.selectable_tag_ids)?;
            let categories = to_json(&activity.category_ids)?;
            conn.execute(
                UPSERT_TYPE_SQL,
                params![
                    activity.id.0,
                    activity.name,
                    activity.icon,
                    activity.color.color_id,
                    activity.color.color_int,
                    activity.goal_seconds,
                    activity.rank,
                    activity.archived,
                    tags,
                    categories,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn get_type(&self, type_id: ActivityTypeId) -> Result<Option<ActivityType>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Option<ActivityType>> {
            let conn = db.get_connection()?;
            conn.query_row(TYPE_SELECT_BY_ID, params![type_id.0], map_activity_type)
                .optional()
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_types(&self) -> Result<Vec<ActivityType>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<ActivityType>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(TYPE_SELECT_ALL).map_err(map_sql_error)?;
            let rows = stmt.query_map([], map_activity_type).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_running_record(&self, type_id: ActivityTypeId) -> Result<Option<RunningRecord>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Option<RunningRecord>> {
            let conn = db.get_connection()?;
            conn.query_row(RUNNING_SELECT_BY_TYPE, params![type_id.0], map_running_record)
                .optional()
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_running_records(&self) -> Result<Vec<RunningRecord>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<RunningRecord>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(RUNNING_SELECT_ALL).map_err(map_sql_error)?;
            let rows = stmt.query_map([], map_running_record).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn create_running(&self, record: NewRunningRecord) -> Result<RunningRecordId> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<RunningRecordId> {
            let conn = db.get_connection()?;
            let tags = to_json(&record.tag_ids)?;
            conn.execute(
                INSERT_RUNNING_SQL,
                params![
                    record.activity_type_id.0,
                    record.started_at.timestamp_millis(),
                    tags,
                    record.comment,
                ],
            )
            .map_err(map_sql_error)?;
            let id = RunningRecordId(conn.last_insert_rowid());
            debug!(
                running_record_id = %id,
                activity_type_id = %record.activity_type_id,
                "running record inserted"
            );
            Ok(id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn convert_to_completed(
        &self,
        running_id: RunningRecordId,
        ended_at: DateTime<Utc>,
    ) -> Result<Record> {
        let db = Arc::clone(&self.db);
        // Stored with millisecond precision; return what a later read sees.
        let ended_at =
            DateTime::from_timestamp_millis(ended_at.timestamp_millis()).unwrap_or(ended_at);

        task::spawn_blocking(move || -> Result<Record> {
            let mut conn = db.get_connection()?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(map_sql_error)?;

            let running = tx
                .query_row(RUNNING_SELECT_BY_ID, params![running_id.0], map_running_record)
                .optional()
                .map_err(map_sql_error)?
                .ok_or_else(|| StintError::NotFound(format!("running record {running_id}")))?;

            tx.execute("DELETE FROM running_records WHERE id = ?1", params![running_id.0])
                .map_err(map_sql_error)?;

            let draft = Record::from_running(RecordId(0), running, ended_at);
            let tags = to_json(&draft.tag_ids)?;
            tx.execute(
                INSERT_RECORD_SQL,
                params![
                    draft.activity_type_id.0,
                    draft.started_at.timestamp_millis(),
                    draft.ended_at.timestamp_millis(),
                    tags,
                    draft.comment,
                ],
            )
            .map_err(map_sql_error)?;
            let record = Record { id: RecordId(tx.last_insert_rowid()), ..draft };

            tx.commit().map_err(map_sql_error)?;
            Ok(record)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_records(&self) -> Result<Vec<Record>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<Record>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(RECORD_SELECT_ALL).map_err(map_sql_error)?;
            let rows = stmt.query_map([], map_record).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

const UPSERT_TYPE_SQL: &str = "INSERT INTO activity_types (
        id, name, icon, color_id, color_int, goal_seconds, rank, archived,
        selectable_tag_ids, category_ids
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        icon = excluded.icon,
        color_id = excluded.color_id,
        color_int = excluded.color_int,
        goal_seconds = excluded.goal_seconds,
        rank = excluded.rank,
        archived = excluded.archived,
        selectable_tag_ids = excluded.selectable_tag_ids,
        category_ids = excluded.category_ids";

const TYPE_SELECT_BY_ID: &str = "SELECT id, name, icon, color_id, color_int, goal_seconds, rank,
        archived, selectable_tag_ids, category_ids
    FROM activity_types WHERE id = ?1";

const TYPE_SELECT_ALL: &str = "SELECT id, name, icon, color_id, color_int, goal_seconds, rank,
        archived, selectable_tag_ids, category_ids
    FROM activity_types ORDER BY rank, id";

const INSERT_RUNNING_SQL: &str = "INSERT INTO running_records (
        activity_type_id, started_at_ms, tag_ids, comment
    ) VALUES (?1, ?2, ?3, ?4)";

const RUNNING_SELECT_BY_ID: &str =
    "SELECT id, activity_type_id, started_at_ms, tag_ids, comment FROM running_records WHERE id = ?1";

const RUNNING_SELECT_BY_TYPE: &str = "SELECT id, activity_type_id, started_at_ms, tag_ids, comment
    FROM running_records WHERE activity_type_id = ?1";

const RUNNING_SELECT_ALL: &str = "SELECT id, activity_type_id, started_at_ms, tag_ids, comment
    FROM running_records ORDER BY id";

const INSERT_RECORD_SQL: &str = "INSERT INTO records (
        activity_type_id, started_at_ms, ended_at_ms, tag_ids, comment
    ) VALUES (?1, ?2, ?3, ?4, ?5)";

const RECORD_SELECT_ALL: &str = "SELECT id, activity_type_id, started_at_ms, ended_at_ms, tag_ids,
        comment
    FROM records ORDER BY started_at_ms, id";

fn map_activity_type(row: &Row<'_>) -> rusqlite::Result<ActivityType> {
    Ok(ActivityType {
        id: ActivityTypeId(row.get(0)?),
        name: row.get(1)?,
        icon: row.get(2)?,
        color: AppColor { color_id: row.get(3)?, color_int: row.get(4)? },
        goal_seconds: row.get(5)?,
        rank: row.get(6)?,
        archived: row.get(7)?,
        selectable_tag_ids: json_column(row, 8)?,
        category_ids: json_column(row, 9)?,
    })
}

fn map_running_record(row: &Row<'_>) -> rusqlite::Result<RunningRecord> {
    Ok(RunningRecord {
        id: RunningRecordId(row.get(0)?),
        activity_type_id: ActivityTypeId(row.get(1)?),
        started_at: timestamp_column(row, 2)?,
        tag_ids: json_column(row, 3)?,
        comment: row.get(4)?,
    })
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        id: RecordId(row.get(0)?),
        activity_type_id: ActivityTypeId(row.get(1)?),
        started_at: timestamp_column(row, 2)?,
        ended_at: timestamp_column(row, 3)?,
        tag_ids: json_column(row, 4)?,
        comment: row.get(5)?,
    })
}
