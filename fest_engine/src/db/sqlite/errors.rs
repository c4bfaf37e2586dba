use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::traits::StoreError;

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Database migration error: {0}")]
    MigrationError(#[from] MigrateError),
    #[error("Unique constraint violated: {0}")]
    UniqueConstraint(String),
    #[error("Database query error: {0}")]
    QueryError(String),
}

impl SqliteDatabaseError {
    /// Separates unique-index violations from every other driver failure, so that they can be reported as conflicts.
    pub fn from_write_error(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::UniqueConstraint(db_err.message().to_string())
            },
            _ => Self::DriverError(e),
        }
    }
}

impl From<SqliteDatabaseError> for StoreError {
    fn from(e: SqliteDatabaseError) -> Self {
        match e {
            // Two writers computed the same registration number. Trying again picks up the new maximum.
            SqliteDatabaseError::UniqueConstraint(msg) if msg.contains("registration_id") => StoreError::Transient(msg),
            SqliteDatabaseError::UniqueConstraint(_) => StoreError::Conflict,
            SqliteDatabaseError::DriverError(e) => StoreError::Transient(e.to_string()),
            SqliteDatabaseError::MigrationError(e) => StoreError::Query(e.to_string()),
            SqliteDatabaseError::QueryError(s) => StoreError::Query(s),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        SqliteDatabaseError::from(e).into()
    }
}
