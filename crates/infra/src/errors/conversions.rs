//! Conversions from external infrastructure errors into domain errors.

use r2d2::Error as PoolError;
use rusqlite::Error as SqlError;
use stint_domain::StintError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub StintError);

impl From<InfraError> for StintError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<StintError> for InfraError {
    fn from(value: StintError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoStintError {
    fn into_stint(self) -> StintError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → StintError */
/* -------------------------------------------------------------------------- */

// Extended result codes for the constraint failures the schema can raise.
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

impl IntoStintError for SqlError {
    fn into_stint(self) -> StintError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        StintError::StoreUnavailable("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        StintError::StoreUnavailable("database is locked".into())
                    }
                    (
                        ErrorCode::CannotOpen
                        | ErrorCode::SystemIoFailure
                        | ErrorCode::DiskFull
                        | ErrorCode::ReadOnly,
                        _,
                    ) => StintError::StoreUnavailable(format!(
                        "sqlite unavailable ({:?}): {message}",
                        err.code
                    )),
                    (
                        ErrorCode::ConstraintViolation,
                        SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY,
                    ) => StintError::Conflict(format!("unique constraint violation: {message}")),
                    (ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_FOREIGNKEY) => {
                        StintError::NotFound(format!("referenced row does not exist: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, _) => {
                        StintError::Validation(format!("constraint violation: {message}"))
                    }
                    _ => StintError::Internal(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => StintError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                StintError::Internal(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                StintError::Internal(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => StintError::StoreUnavailable(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => StintError::Internal(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_stint())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → StintError */
/* -------------------------------------------------------------------------- */

impl IntoStintError for PoolError {
    fn into_stint(self) -> StintError {
        StintError::StoreUnavailable(format!("connection pool: {self}"))
    }
}

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        InfraError(value.into_stint())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → StintError */
/* -------------------------------------------------------------------------- */

impl IntoStintError for serde_json::Error {
    fn into_stint(self) -> StintError {
        StintError::Internal(format!("malformed id list column: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_stint())
    }
}
