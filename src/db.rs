use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

pub type DbPool = Pool<SqliteConnectionManager>;

// Cascading deletes (session -> entries) rely on this being set per connection.
const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

pub fn create_pool(database_url: &str) -> Result<DbPool, r2d2::Error> {
    let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
    // Drop query parameters such as ?mode=rwc
    let path = path.split('?').next().unwrap_or(path);

    if path == ":memory:" {
        return create_memory_pool();
    }

    let manager = SqliteConnectionManager::file(Path::new(path))
        .with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));

    Pool::builder().max_size(5).build(manager)
}

/// Single-connection pool: every SQLite `:memory:` connection is its own database.
pub fn create_memory_pool() -> Result<DbPool, r2d2::Error> {
    let manager =
        SqliteConnectionManager::memory().with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));

    Pool::builder().max_size(1).build(manager)
}

/// Round-trip a trivial query through the pool.
pub async fn ping(pool: &DbPool) -> bool {
    let pool = pool.clone();
    let result = tokio::task::spawn_blocking(move || -> anyhow::Result<i64> {
        let conn = pool.get()?;
        Ok(conn.query_row("SELECT 1", [], |row| row.get(0))?)
    })
    .await;

    match result {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            tracing::warn!("Database ping failed: {}", e);
            false
        }
        Err(e) => {
            tracing::warn!("Database ping task failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_url_uses_single_connection() {
        let pool = create_pool("sqlite::memory:").unwrap();

        assert_eq!(pool.max_size(), 1);
    }

    #[tokio::test]
    async fn test_ping() {
        let pool = create_memory_pool().unwrap();

        assert!(ping(&pool).await);
    }
}
