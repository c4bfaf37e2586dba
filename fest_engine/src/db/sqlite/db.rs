use std::{fmt::Debug, sync::Arc, time::Duration};

use log::*;
use sqlx::{migrate, SqlitePool};
use tokio::sync::OnceCell;

use super::{db_url, new_pool, queries, registrations, SqliteDatabaseError};
use crate::{
    db_types::{
        event_key,
        EventStat,
        NewRegistration,
        Pagination,
        Registration,
        RegistrationFilter,
        RegistrationOverview,
        Sorting,
    },
    traits::{RegistrationManagement, RegistrationQueries, StoreError},
};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(60);

/// Handle to the SQLite registration store.
///
/// The handle is cheap to clone and every clone shares the same pool. The pool itself is opened on first use: all
/// callers that arrive while the connection is being established wait for that single attempt instead of opening
/// pools of their own.
#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    max_connections: u32,
    acquire_timeout: Duration,
    pool: Arc<OnceCell<SqlitePool>>,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({}, connected: {})", self.url, self.pool.initialized())
    }
}

impl SqliteDatabase {
    /// Creates a handle for the database at `url`. No connection is made until the first query.
    pub fn new_lazy<S: Into<String>>(url: S, max_connections: u32, acquire_timeout: Duration) -> Self {
        Self { url: url.into(), max_connections, acquire_timeout, pool: Arc::new(OnceCell::new()) }
    }

    /// Creates a handle using `FEST_DATABASE_URL` (or the default location) and default pool settings.
    pub fn new_from_env() -> Self {
        Self::new_lazy(db_url(), DEFAULT_MAX_CONNECTIONS, DEFAULT_ACQUIRE_TIMEOUT)
    }

    /// Creates a handle and connects straight away.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let db = Self::new_lazy(url, max_connections, DEFAULT_ACQUIRE_TIMEOUT);
        let _ = db.pool().await?;
        Ok(db)
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub async fn pool(&self) -> Result<&SqlitePool, SqliteDatabaseError> {
        self.pool
            .get_or_try_init(|| async {
                debug!("🗃️ Opening connection pool for {}", self.url);
                let pool = new_pool(&self.url, self.max_connections, self.acquire_timeout).await?;
                info!("🗃️ Connected to {}", self.url);
                Ok(pool)
            })
            .await
    }

    pub async fn run_migrations(&self) -> Result<(), SqliteDatabaseError> {
        let pool = self.pool().await?;
        migrate!("./src/db/sqlite/migrations").run(pool).await?;
        info!("🗃️ Migrations complete");
        Ok(())
    }

    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
        }
    }
}

impl RegistrationManagement for SqliteDatabase {
    async fn registration_exists(&self, event: &str, email: &str, mobile: &str) -> Result<bool, StoreError> {
        let mut conn = self.pool().await?.acquire().await?;
        let exists = registrations::registration_exists(&event_key(event), email, mobile, &mut conn).await?;
        Ok(exists)
    }

    async fn insert_registration(&self, registration: NewRegistration) -> Result<Registration, StoreError> {
        let mut tx = self.pool().await?.begin().await?;
        let result = registrations::insert_registration(registration, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Registration #{} for {} has been saved in the DB with id {}",
            result.registration_id, result.selected_event, result.id
        );
        Ok(result)
    }
}

impl RegistrationQueries for SqliteDatabase {
    async fn fetch_registrations(
        &self,
        filter: &RegistrationFilter,
        sorting: Sorting,
        page: Option<Pagination>,
    ) -> Result<Vec<Registration>, StoreError> {
        let mut conn = self.pool().await?.acquire().await?;
        let registrations = queries::fetch_registrations(filter, sorting, page, &mut conn).await?;
        Ok(registrations)
    }

    async fn count_registrations(&self, filter: &RegistrationFilter) -> Result<i64, StoreError> {
        let mut conn = self.pool().await?.acquire().await?;
        let count = queries::count_registrations(filter, &mut conn).await?;
        Ok(count)
    }

    async fn registered_events(&self) -> Result<Vec<String>, StoreError> {
        let mut conn = self.pool().await?.acquire().await?;
        let events = queries::registered_events(&mut conn).await?;
        Ok(events)
    }

    async fn registration_overview(&self) -> Result<RegistrationOverview, StoreError> {
        let mut conn = self.pool().await?.acquire().await?;
        let overview = queries::registration_overview(&mut conn).await?;
        Ok(overview)
    }

    async fn event_statistics(&self) -> Result<Vec<EventStat>, StoreError> {
        let mut conn = self.pool().await?.acquire().await?;
        let stats = queries::event_statistics(&mut conn).await?;
        Ok(stats)
    }
}
