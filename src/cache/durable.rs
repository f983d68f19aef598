//! Durable cache tier
//!
//! `DurableStore` is the capability the two-tier cache talks to. The SQLite
//! implementation persists entries across restarts; `NullStore` stands in
//! when no durable store is configured or the database cannot be opened, so
//! callers never branch on availability.
//!
//! Every SQLite operation checks a connection out of the pool, runs one
//! self-contained statement on the blocking thread pool and returns it.

use crate::errors::{ResolverError, ResolverResult};
use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Maximum pooled SQLite connections
const POOL_SIZE: u32 = 4;

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// How long checking a connection out of the pool may take
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Row stored in the durable tier
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub value: String,
    /// Absolute expiry, unix seconds
    pub expires_at: i64,
}

#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &'static str;

    /// False for the null object
    fn is_persistent(&self) -> bool;

    async fn load(&self, key: &str) -> ResolverResult<Option<StoredEntry>>;

    async fn store(&self, key: &str, entry: &StoredEntry) -> ResolverResult<()>;

    async fn remove(&self, key: &str) -> ResolverResult<()>;

    /// Delete every row with `expiry <= now`, returns the number deleted
    async fn purge_expired(&self, now: i64) -> ResolverResult<usize>;
}

// ============================================================================
// NULL STORE
// ============================================================================

/// Durable tier that remembers nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

#[async_trait]
impl DurableStore for NullStore {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_persistent(&self) -> bool {
        false
    }

    async fn load(&self, _key: &str) -> ResolverResult<Option<StoredEntry>> {
        Ok(None)
    }

    async fn store(&self, _key: &str, _entry: &StoredEntry) -> ResolverResult<()> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> ResolverResult<()> {
        Ok(())
    }

    async fn purge_expired(&self, _now: i64) -> ResolverResult<usize> {
        Ok(0)
    }
}

// ============================================================================
// SQLITE STORE
// ============================================================================

/// SQLite-backed store, one `cache` table indexed on expiry
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the cache database at `path`
    pub fn open(path: impl AsRef<Path>) -> ResolverResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ResolverError::CacheUnavailable(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let manager = SqliteConnectionManager::file(&path)
            .with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));
        let pool = Pool::builder()
            .max_size(POOL_SIZE)
            .connection_timeout(CONNECT_TIMEOUT)
            .build(manager)?;

        let store = Self { pool, path };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> ResolverResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    fn initialize_schema(&self) -> ResolverResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expiry INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_cache_expiry ON cache(expiry);
            "#,
        )?;

        Ok(())
    }

    /// Run `op` with a pooled connection on the blocking thread pool
    async fn with_conn<T, F>(&self, op: F) -> ResolverResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            op(&*conn).map_err(ResolverError::from)
        })
        .await
        .map_err(|e| ResolverError::CacheUnavailable(format!("cache task failed: {}", e)))?
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

#[async_trait]
impl DurableStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn is_persistent(&self) -> bool {
        true
    }

    async fn load(&self, key: &str) -> ResolverResult<Option<StoredEntry>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT value, expiry FROM cache WHERE key = ?1",
                params![key],
                |row| {
                    Ok(StoredEntry {
                        value: row.get(0)?,
                        expires_at: row.get(1)?,
                    })
                },
            )
            .optional()
        })
        .await
    }

    async fn store(&self, key: &str, entry: &StoredEntry) -> ResolverResult<()> {
        let key = key.to_string();
        let entry = entry.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO cache (key, value, expiry) VALUES (?1, ?2, ?3)",
                params![key, entry.value, entry.expires_at],
            )
            .map(|_| ())
        })
        .await
    }

    async fn remove(&self, key: &str) -> ResolverResult<()> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM cache WHERE key = ?1", params![key])
                .map(|_| ())
        })
        .await
    }

    async fn purge_expired(&self, now: i64) -> ResolverResult<usize> {
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM cache WHERE expiry <= ?1", params![now])
        })
        .await
    }
}
