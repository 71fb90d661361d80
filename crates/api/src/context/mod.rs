//! Application context - dependency injection container

use std::fs;
use std::path::Path;
use std::sync::Arc;

use stint_core::{FilterRegistry, RecordStore, SystemClock, TrackingOptions, TrackingService};
use stint_domain::{Config, Result, StintError};
use stint_infra::{DbManager, SqliteFilterRegistry, SqliteRecordStore};
use tracing::info;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub record_store: Arc<SqliteRecordStore>,
    pub tracking_service: Arc<TrackingService>,
}

impl AppContext {
    /// Open the database, apply migrations and wire the tracking service.
    ///
    /// The surface starts hidden: no refresh loop runs until
    /// `set_tracking_visible(true)`.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        ensure_parent_dir(Path::new(&config.database.path))?;

        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let record_store = Arc::new(SqliteRecordStore::new(Arc::clone(&db)));
        let store: Arc<dyn RecordStore> = record_store.clone();
        let registry: Arc<dyn FilterRegistry> =
            Arc::new(SqliteFilterRegistry::new(Arc::clone(&db)));

        let options = TrackingOptions {
            refresh: config.refresh.clone(),
            combination: config.filters.combination,
        };
        let tracking_service =
            Arc::new(TrackingService::new(store, registry, Arc::new(SystemClock), options));

        info!(
            db_path = %config.database.path,
            interval_ms = config.refresh.interval_ms,
            combination = %config.filters.combination,
            "application context initialised"
        );

        Ok(Self { config, db, record_store, tracking_service })
    }

    /// Stop the refresh loop. Safe to call more than once.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutdown called on AppContext");
        self.tracking_service.shutdown().await;
        Ok(())
    }
}

fn ensure_parent_dir(db_path: &Path) -> Result<()> {
    match db_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|e| {
                StintError::Config(format!(
                    "cannot create database directory {}: {e}",
                    parent.display()
                ))
            }),
        _ => Ok(()),
    }
}
