//! Database client for Consulta
//!
//! A pooled, database agnostic client built on SQLx's `Any` driver.
//!
//! SQLite admits a single writer. Every write of this crate goes through
//! [`DbClient::lock_writes`] or [`DbClient::begin_write`], so writers of one
//! process queue on an async mutex instead of failing with `SQLITE_BUSY`.
//! Readers never take the lock. The busy timeout covers other processes
//! sharing the file.

use crate::error::DbError;
use consulta_config::{AppConfig, DatabaseConfig};
use sqlx::pool::PoolOptions;
use sqlx::{AnyConnection, Executor, Pool, Transaction};
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info};

/// Type alias for a database transaction
pub type DbTransaction<'a> = Transaction<'a, sqlx::Any>;

/// How long a SQLite connection waits for a lock held by another process.
const SQLITE_BUSY_TIMEOUT: &str = "PRAGMA busy_timeout = 5000";

/// Database client for Consulta
///
/// Cloning is cheap; clones share the connection pool and the write lock.
#[derive(Debug, Clone)]
pub struct DbClient {
    /// The database connection pool
    pool: Pool<sqlx::Any>,
    write_lock: Arc<Mutex<()>>,
}

/// A transaction that holds the client's write lock until it ends.
///
/// Dereferences to the connection, so `&mut *tx` works as an executor.
pub struct WriteTransaction {
    // Declared first so the transaction is dropped before the lock is released
    tx: DbTransaction<'static>,
    _guard: OwnedMutexGuard<()>,
}

impl WriteTransaction {
    pub async fn commit(self) -> Result<(), DbError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))
    }

    pub async fn rollback(self) -> Result<(), DbError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))
    }
}

impl Deref for WriteTransaction {
    type Target = AnyConnection;

    fn deref(&self) -> &AnyConnection {
        &self.tx
    }
}

impl DerefMut for WriteTransaction {
    fn deref_mut(&mut self) -> &mut AnyConnection {
        &mut self.tx
    }
}

impl DbClient {
    /// Create a new database client from the application configuration
    ///
    /// # Errors
    ///
    /// * The database configuration is missing
    /// * The database URL is empty
    /// * The database connection fails
    pub async fn new(config: &AppConfig) -> Result<Self, DbError> {
        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| DbError::ConfigError("Database configuration is missing".to_string()))?;

        Self::from_config(db_config).await
    }

    /// Create a new database client from a database configuration
    pub async fn from_config(db_config: &DatabaseConfig) -> Result<Self, DbError> {
        if db_config.url.is_empty() {
            return Err(DbError::ConfigError("Database URL is empty".to_string()));
        }

        Self::from_url(&db_config.url).await
    }

    /// Create a new database client from a database URL
    ///
    /// SQLite URLs (`sqlite:path` or `sqlite://path`) get their parent
    /// directory and an empty database file created when missing.
    pub async fn from_url(db_url: &str) -> Result<Self, DbError> {
        if db_url.is_empty() {
            return Err(DbError::UrlError("Database URL is empty".to_string()));
        }

        let pool = Self::create_pool(db_url).await?;
        Ok(Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    async fn create_pool(db_url: &str) -> Result<Pool<sqlx::Any>, DbError> {
        debug!("Creating database pool with URL: {}", db_url);

        // Register the compiled-in drivers with the "any" driver
        sqlx::any::install_default_drivers();

        let is_sqlite = db_url.starts_with("sqlite:");
        let pool_options = PoolOptions::<sqlx::Any>::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .idle_timeout(Duration::from_secs(600))
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    if is_sqlite {
                        conn.execute(SQLITE_BUSY_TIMEOUT).await?;
                        conn.execute("PRAGMA journal_mode = WAL").await?;
                    }
                    Ok(())
                })
            });

        // AnyConnectOptions cannot set create_if_missing, so prepare the file here
        if let Some(db_path) = sqlite_file_path(db_url) {
            prepare_sqlite_file(Path::new(db_path))?;
        }

        let connect_options = sqlx::any::AnyConnectOptions::from_str(db_url)
            .map_err(|e| DbError::UrlError(e.to_string()))?;

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                error!("Failed to create database pool: {}", e);
                DbError::PoolError(e.to_string())
            })?;

        info!("Database pool created successfully");
        Ok(pool)
    }

    /// Get the database connection pool
    pub fn pool(&self) -> &Pool<sqlx::Any> {
        &self.pool
    }

    /// Waits for the write lock. Hold the guard while a single write statement runs.
    pub async fn lock_writes(&self) -> OwnedMutexGuard<()> {
        self.write_lock.clone().lock_owned().await
    }

    /// Begin a transaction that may write, holding the write lock until it ends
    pub async fn begin_write(&self) -> Result<WriteTransaction, DbError> {
        let guard = self.lock_writes().await;
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;
        Ok(WriteTransaction { tx, _guard: guard })
    }

    /// Execute a statement that returns no rows, returning the number of rows affected
    pub async fn execute(&self, query: &str) -> Result<u64, DbError> {
        let _write = self.lock_writes().await;
        sqlx::query(query)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    /// Check if the database answers a trivial query
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

impl std::fmt::Display for DbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DbClient")
    }
}

/// The file path of an on-disk SQLite URL, `None` for other backends and `:memory:`.
fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let path = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))?;
    // Drop connection parameters such as `?mode=rwc`
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.contains(":memory:") {
        None
    } else {
        Some(path)
    }
}

fn prepare_sqlite_file(db_path: &Path) -> Result<(), DbError> {
    if let Some(dir) = db_path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            debug!("Creating directory for SQLite database: {:?}", dir);
            std::fs::create_dir_all(dir).map_err(|e| {
                error!("Failed to create directory for SQLite database: {}", e);
                DbError::PoolError(format!("Failed to create directory: {}", e))
            })?;
        }
    }

    if !db_path.exists() {
        debug!("Creating empty SQLite database file: {:?}", db_path);
        std::fs::File::create(db_path).map_err(|e| {
            error!("Failed to create SQLite database file: {}", e);
            DbError::PoolError(format!("Failed to create database file: {}", e))
        })?;
    }
    Ok(())
}
