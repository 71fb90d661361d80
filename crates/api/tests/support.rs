#![allow(dead_code)]

use stint_api::AppContext;
use stint_domain::{ActivityType, ActivityTypeId, CategoryId, Config, DatabaseConfig, TagId};
use tempfile::TempDir;

/// Create an `AppContext` over a fresh database in a temporary directory.
///
/// Returns the temp dir alongside so it outlives the context.
pub fn create_test_context() -> (AppContext, TempDir) {
    let temp_dir = TempDir::new().expect("failed to create temporary test directory");
    let db_path = temp_dir.path().join("data").join("stint.db");

    let config = Config {
        database: DatabaseConfig { path: db_path.to_string_lossy().to_string(), pool_size: 4 },
        ..Config::default()
    };

    let ctx = AppContext::new(config).expect("AppContext creation should succeed");
    (ctx, temp_dir)
}

/// Context with catalog: 1 "Work" (category 10), 2 "Gym", 3 "Read" (tags 7, 8).
pub async fn seeded_context() -> (AppContext, TempDir) {
    let (ctx, temp_dir) = create_test_context();

    let mut work = ActivityType::new(ActivityTypeId(1), "Work", 0);
    work.category_ids = [CategoryId(10)].into_iter().collect();
    let gym = ActivityType::new(ActivityTypeId(2), "Gym", 1);
    let mut read = ActivityType::new(ActivityTypeId(3), "Read", 2);
    read.selectable_tag_ids = [TagId(7), TagId(8)].into_iter().collect();

    for activity in [work, gym, read] {
        ctx.record_store.upsert_type(activity).await.expect("failed to seed activity type");
    }
    (ctx, temp_dir)
}
