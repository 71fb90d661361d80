#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use stint_domain::{ActivityType, ActivityTypeId, CategoryId, TagId};
use stint_infra::database::{DbManager, SqliteFilterRegistry, SqliteRecordStore};
use tempfile::TempDir;

/// Shared context for integration tests that need direct database access.
pub struct TestContext {
    pub db: Arc<DbManager>,
    pub store: Arc<SqliteRecordStore>,
    pub registry: Arc<SqliteFilterRegistry>,
    /// Keep temporary directory alive for the lifetime of the context.
    _temp_dir: TempDir,
}

/// Create a new test context with a fresh, migrated database.
pub async fn setup_test_context() -> TestContext {
    let temp_dir = TempDir::new().expect("failed to create temporary database directory");
    let db_path = temp_dir.path().join("stint.db");

    let db = Arc::new(DbManager::new(&db_path, 8).expect("failed to initialise sqlite manager"));
    db.run_migrations().expect("failed to run schema migrations");

    let store = Arc::new(SqliteRecordStore::new(Arc::clone(&db)));
    let registry = Arc::new(SqliteFilterRegistry::new(Arc::clone(&db)));

    TestContext { db, store, registry, _temp_dir: temp_dir }
}

/// Context seeded with a small catalog:
/// 1 "Work" (category 10), 2 "Gym" (category 20), 3 "Read" (tags 7, 8).
pub async fn seeded_context() -> TestContext {
    let ctx = setup_test_context().await;

    let mut work = ActivityType::new(ActivityTypeId(1), "Work", 0);
    work.category_ids = [CategoryId(10)].into_iter().collect();
    work.goal_seconds = Some(3_600);
    let mut gym = ActivityType::new(ActivityTypeId(2), "Gym", 1);
    gym.category_ids = [CategoryId(20)].into_iter().collect();
    let mut read = ActivityType::new(ActivityTypeId(3), "Read", 2);
    read.selectable_tag_ids = [TagId(7), TagId(8)].into_iter().collect();

    for activity in [work, gym, read] {
        ctx.store.upsert_type(activity).await.expect("failed to seed activity type");
    }
    ctx
}

/// Millisecond-aligned timestamp, matching the stored precision.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
}
