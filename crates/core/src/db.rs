//! SQLite connection handling and schema setup.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::repositories::{PatientRepository, StaffRepository};
use crate::MiddlewareResult;

/// Owns the connection pool and hands out the repositories built on it.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool for `url`, creating the database file if it does not exist.
    ///
    /// In-memory URLs get a single long-lived connection, because every new SQLite
    /// connection to `:memory:` would otherwise see its own empty database.
    pub async fn connect(url: &str) -> MiddlewareResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = if is_in_memory(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(10)
                .connect_with(options)
                .await?
        };

        Ok(Self { pool })
    }

    /// Create the staff and patient tables and their indexes if missing.
    ///
    /// Safe to run on every startup.
    pub async fn migrate(&self) -> MiddlewareResult<()> {
        self.staff().migrate().await?;
        self.patients().migrate().await?;
        tracing::debug!("database schema is up to date");
        Ok(())
    }

    pub fn patients(&self) -> PatientRepository {
        PatientRepository::new(self.pool.clone())
    }

    pub fn staff(&self) -> StaffRepository {
        StaffRepository::new(self.pool.clone())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.expect("first migration");
        db.migrate().await.expect("second migration");

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('staff', 'patient') ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        assert_eq!(
            tables.into_iter().map(|(n,)| n).collect::<Vec<_>>(),
            vec!["patient".to_string(), "staff".to_string()]
        );
    }

    #[tokio::test]
    async fn creates_database_file_on_first_connect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.db");
        let url = format!("sqlite://{}", path.display());

        let db = Database::connect(&url).await.expect("connect should create the file");
        db.migrate().await.unwrap();

        assert!(path.exists());
    }

    #[test]
    fn detects_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://shared?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://middleware.db"));
    }
}
