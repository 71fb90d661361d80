//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If `STINT_DB_PATH` is set, configuration comes from the environment
//! 2. Otherwise the loader probes for a config file (JSON or TOML)
//! 3. With neither present, built-in defaults apply
//!
//! The result is always validated before it is returned.
//!
//! ## Environment Variables
//! - `STINT_DB_PATH`: Database file path (selects environment loading)
//! - `STINT_DB_POOL_SIZE`: Connection pool size
//! - `STINT_REFRESH_INTERVAL_MS`: Refresh cadence while visible
//! - `STINT_FILTER_COMBINATION`: `union` or `intersection`
//! - `STINT_LOG_LEVEL`: Default log filter directive
//! - `STINT_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./stint.json` or `./stint.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use stint_domain::{Config, FilterCombination, Result, StintError};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `StintError::Config` if an environment value or the probed file
/// cannot be parsed, or if the resulting configuration is invalid.
pub fn load() -> Result<Config> {
    let config = if std::env::var_os("STINT_DB_PATH").is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        config
    } else if let Some(path) = probe_config_paths() {
        load_from_file(Some(path))?
    } else {
        tracing::info!("No configuration found, using defaults");
        Config::default()
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// `STINT_DB_PATH` is required; every other variable falls back to its
/// default when unset.
///
/// # Errors
/// Returns `StintError::Config` if `STINT_DB_PATH` is missing or a value
/// cannot be parsed.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.database.path = env_var("STINT_DB_PATH")?;
    if let Some(pool_size) = env_parse::<u32>("STINT_DB_POOL_SIZE", "pool size")? {
        config.database.pool_size = pool_size;
    }
    if let Some(interval) = env_parse::<u64>("STINT_REFRESH_INTERVAL_MS", "refresh interval")? {
        config.refresh.interval_ms = interval;
    }
    if let Some(combination) =
        env_parse::<FilterCombination>("STINT_FILTER_COMBINATION", "filter combination")?
    {
        config.filters.combination = combination;
    }
    if let Ok(level) = std::env::var("STINT_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("STINT_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension). Missing
/// sections take their defaults.
///
/// # Errors
/// Returns `StintError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(StintError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            StintError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| StintError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| StintError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| StintError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(StintError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 6] = [
        "config.json",
        "config.toml",
        "stint.json",
        "stint.toml",
        "../config.json",
        "../config.toml",
    ];

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| StintError::Config(format!("Missing required environment variable: {}", key)))
}

/// Parse an optional environment variable; unset yields `Ok(None)`.
fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| StintError::Config(format!("Invalid {what}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const VARS: [&str; 6] = [
        "STINT_DB_PATH",
        "STINT_DB_POOL_SIZE",
        "STINT_REFRESH_INTERVAL_MS",
        "STINT_FILTER_COMBINATION",
        "STINT_LOG_LEVEL",
        "STINT_LOG_JSON",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    fn write_temp(contents: &str, extension: &str) -> (NamedTempFile, PathBuf) {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        (temp_file, path)
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("TEST_STINT_BOOL_YES", "yes");
        std::env::set_var("TEST_STINT_BOOL_UPPER", "TRUE");
        std::env::set_var("TEST_STINT_BOOL_OFF", "off");

        assert!(env_bool("TEST_STINT_BOOL_YES", false));
        assert!(env_bool("TEST_STINT_BOOL_UPPER", false));
        assert!(!env_bool("TEST_STINT_BOOL_OFF", true));

        std::env::remove_var("TEST_STINT_BOOL_MISSING");
        assert!(env_bool("TEST_STINT_BOOL_MISSING", true));

        std::env::remove_var("TEST_STINT_BOOL_YES");
        std::env::remove_var("TEST_STINT_BOOL_UPPER");
        std::env::remove_var("TEST_STINT_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("STINT_DB_PATH", "/tmp/stint-test.db");
        std::env::set_var("STINT_DB_POOL_SIZE", "2");
        std::env::set_var("STINT_REFRESH_INTERVAL_MS", "250");
        std::env::set_var("STINT_FILTER_COMBINATION", "Intersection");
        std::env::set_var("STINT_LOG_LEVEL", "debug");
        std::env::set_var("STINT_LOG_JSON", "1");

        let config = load_from_env().expect("config loads from env");
        assert_eq!(config.database.path, "/tmp/stint-test.db");
        assert_eq!(config.database.pool_size, 2);
        assert_eq!(config.refresh.interval_ms, 250);
        assert_eq!(config.filters.combination, FilterCombination::Intersection);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);

        clear_env();
    }

    #[test]
    fn test_load_from_env_defaults_optional_vars() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("STINT_DB_PATH", "/tmp/stint-test.db");

        let config = load_from_env().expect("config loads from env");
        assert_eq!(config.refresh, Config::default().refresh);
        assert_eq!(config.filters.combination, FilterCombination::Union);

        clear_env();
    }

    #[test]
    fn test_load_from_env_missing_path() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, StintError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_env_invalid_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("STINT_DB_PATH", "/tmp/stint-test.db");
        std::env::set_var("STINT_REFRESH_INTERVAL_MS", "soon");
        assert!(matches!(load_from_env(), Err(StintError::Config(_))));

        std::env::remove_var("STINT_REFRESH_INTERVAL_MS");
        std::env::set_var("STINT_FILTER_COMBINATION", "xor");
        assert!(matches!(load_from_env(), Err(StintError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_load_rejects_zero_interval() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("STINT_DB_PATH", "/tmp/stint-test.db");
        std::env::set_var("STINT_REFRESH_INTERVAL_MS", "0");
        assert!(matches!(load(), Err(StintError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_load_from_file_json() {
        let (_temp, path) = write_temp(
            r#"{
                "database": { "path": "test.db", "pool_size": 3 },
                "refresh": { "interval_ms": 500 },
                "filters": { "combination": "intersection" }
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).expect("config loads from JSON");
        assert_eq!(config.database.path, "test.db");
        assert_eq!(config.database.pool_size, 3);
        assert_eq!(config.refresh.interval_ms, 500);
        assert_eq!(config.filters.combination, FilterCombination::Intersection);
        assert_eq!(config.logging.level, "info");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_toml() {
        let (_temp, path) = write_temp(
            r#"
[database]
path = "test.db"
pool_size = 6

[logging]
level = "warn"
json = true
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).expect("config loads from TOML");
        assert_eq!(config.database.pool_size, 6);
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.json);
        assert_eq!(config.refresh.interval_ms, 1000);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/config.json"))).unwrap_err();
        assert!(matches!(err, StintError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let (_temp, path) = write_temp(r#"{ "this is": "not valid json" "#, "json");

        assert!(load_from_file(Some(path.clone())).is_err(), "Should fail with invalid JSON");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", &PathBuf::from("test.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }
}
