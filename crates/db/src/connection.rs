use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::OnceCell;

use crate::directory::DirectoryError;

pub type DbPool = sqlx::SqlitePool;

#[derive(Clone, Debug)]
pub struct ConnectionSettings {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

impl From<&freightwatch_core::config::DatabaseConfig> for ConnectionSettings {
    fn from(config: &freightwatch_core::config::DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            timeout_secs: config.timeout_secs,
        }
    }
}

pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

/// Cheap liveness probe used by readiness checks.
pub async fn ping(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await.map(|_| ())
}

/// Lazily-established, process-lifetime connection pool.
///
/// The first operation resolves the connection settings and opens the pool
/// under an initialize-once guard; concurrent first calls wait on the same
/// initialization instead of racing. A failed initialization is returned to
/// the caller that triggered it and retried on the next operation. Broken
/// connections inside an established pool are evicted and re-opened by the
/// pool itself.
pub struct LazyPool {
    settings: ConnectionSettings,
    cell: OnceCell<DbPool>,
}

impl LazyPool {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self { settings, cell: OnceCell::new() }
    }

    /// Wraps an already-established pool, skipping lazy initialization.
    pub fn from_pool(pool: DbPool) -> Self {
        Self {
            settings: ConnectionSettings {
                url: String::new(),
                max_connections: 0,
                timeout_secs: 0,
            },
            cell: OnceCell::new_with(Some(pool)),
        }
    }

    pub async fn get(&self) -> Result<&DbPool, DirectoryError> {
        self.cell
            .get_or_try_init(|| async {
                let url = self.settings.url.trim();
                if url.is_empty() {
                    return Err(DirectoryError::Configuration(
                        "database url is not configured".to_string(),
                    ));
                }
                connect_with_settings(url, self.settings.max_connections, self.settings.timeout_secs)
                    .await
                    .map_err(DirectoryError::Database)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionSettings, LazyPool};
    use crate::directory::DirectoryError;

    #[tokio::test]
    async fn lazy_pool_reports_missing_url_as_configuration_fault() {
        let lazy = LazyPool::new(ConnectionSettings {
            url: "  ".to_string(),
            max_connections: 1,
            timeout_secs: 5,
        });

        let error = lazy.get().await.err().expect("initialization should fail");
        assert!(matches!(error, DirectoryError::Configuration(_)));
    }

    #[tokio::test]
    async fn lazy_pool_retries_initialization_after_failure() {
        let lazy = LazyPool::new(ConnectionSettings {
            url: "sqlite:///nonexistent-dir/freightwatch.db".to_string(),
            max_connections: 1,
            timeout_secs: 1,
        });

        assert!(lazy.get().await.is_err());
        // The failed attempt must not poison the cell.
        assert!(lazy.get().await.is_err());
    }

    #[tokio::test]
    async fn lazy_pool_initializes_once_and_reuses_the_pool() {
        let lazy = LazyPool::new(ConnectionSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            timeout_secs: 5,
        });

        let first = lazy.get().await.expect("first initialization should succeed");
        let second = lazy.get().await.expect("second call should reuse the pool");
        assert!(std::ptr::eq(first, second));
    }
}
