mod db;
mod errors;

pub mod queries;
pub mod registrations;

use std::{env, path::PathBuf, str::FromStr, time::Duration};

pub use db::SqliteDatabase;
pub use errors::SqliteDatabaseError;
use log::*;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

const SQLITE_DB_URL: &str = "sqlite://data/fest_registrations.db";
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

pub fn db_url() -> String {
    let result = env::var("FEST_DATABASE_URL").unwrap_or_else(|_| {
        info!("FEST_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

/// Opens a connection pool, creating the database file (and its parent directory) if it does not exist yet.
pub async fn new_pool(
    url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<SqlitePool, SqliteDatabaseError> {
    if let Some(dir) = database_file(url).and_then(|p| p.parent().map(PathBuf::from)) {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            debug!("🗃️ Creating database directory {}", dir.display());
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| SqliteDatabaseError::QueryError(format!("Cannot create {}. {e}", dir.display())))?;
        }
    }
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// The file behind a `sqlite:` URL, or `None` for in-memory databases.
fn database_file(url: &str) -> Option<PathBuf> {
    let path = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:")).unwrap_or(url);
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(PathBuf::from(path))
    }
}
