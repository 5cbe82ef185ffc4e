//! SQLite backend.
//!
//! The pool is opened in WAL mode and migrated on startup. Each record is
//! stored as its JSON serialization plus a few indexed columns for ordering
//! and grouping.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use log::{error, info};
use sqlx::{Pool, Row, Sqlite, SqlitePool};

use super::{VisitorField, VisitorStore};
use crate::error_handling::StorageError;
use crate::models::VisitorRecord;

/// Visitor log in a SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `db_path`, enables WAL and
    /// runs migrations.
    pub async fn open(db_path: &Path) -> Result<Self, StorageError> {
        let pool = init_db_pool_with_path(db_path).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    fn decode_rows(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<VisitorRecord>, StorageError> {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let json: String = row.try_get("record")?;
            match serde_json::from_str(&json) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("Skipping undecodable visit row: {}", e),
            }
        }
        Ok(records)
    }
}

/// Creates the database file if it doesn't exist and enables WAL mode.
async fn init_db_pool_with_path(db_path: &Path) -> Result<Pool<Sqlite>, StorageError> {
    let db_path_str = db_path.to_string_lossy().to_string();
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(&db_path_str)
    {
        Ok(_) => info!("Database file created successfully."),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("Database file already exists.")
        }
        Err(e) => {
            error!("Failed to create database file: {e}");
            return Err(e.into());
        }
    }

    let pool = SqlitePool::connect(&format!("sqlite:{}", db_path_str))
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {e}");
            StorageError::Sql(e)
        })?;

    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await
        .map_err(|e| {
            error!("Failed to set WAL mode: {e}");
            StorageError::Sql(e)
        })?;

    Ok(pool)
}

/// Runs the SQLx migrations embedded from `migrations/` at build time.
async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), StorageError> {
    sqlx::migrate!()
        .run(pool)
        .await
        .map_err(|e| StorageError::Migration(e.to_string()))
}

#[async_trait]
impl VisitorStore for SqliteStore {
    async fn append(&self, record: &VisitorRecord) -> Result<(), StorageError> {
        let json = serde_json::to_string(record)?;
        sqlx::query(
            "INSERT INTO visits (timestamp, session_id, source, ip, browser, os, device_type, country, record)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.timestamp.to_rfc3339())
        .bind(&record.session_id)
        .bind(record.source.to_string())
        .bind(&record.network.ip)
        .bind(&record.browser.name)
        .bind(&record.os.name)
        .bind(&record.device.device_type)
        .bind(record.country())
        .bind(json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<VisitorRecord>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query("SELECT record FROM visits ORDER BY id DESC LIMIT ?")
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Self::decode_rows(rows)
    }

    async fn all(&self) -> Result<Vec<VisitorRecord>, StorageError> {
        let rows = sqlx::query("SELECT record FROM visits ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Self::decode_rows(rows)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM visits").execute(&self.pool).await?;
        info!("Cleared {} visit rows", result.rows_affected());
        Ok(())
    }

    async fn count(&self) -> Result<usize, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visits")
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn count_by(&self, field: VisitorField) -> Result<BTreeMap<String, usize>, StorageError> {
        // column names come from a closed enum, never from input
        let sql = format!(
            "SELECT {col} AS value, COUNT(*) AS n FROM visits GROUP BY {col}",
            col = field.column()
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut counts = BTreeMap::new();
        for row in rows {
            let value: String = row.try_get("value")?;
            let n: i64 = row.try_get("n")?;
            counts.insert(value, usize::try_from(n).unwrap_or_default());
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::sample_record;
    use tempfile::TempDir;

    async fn open_store(temp: &TempDir) -> SqliteStore {
        SqliteStore::open(&temp.path().join("visitors.db"))
            .await
            .expect("store should open")
    }

    #[tokio::test]
    async fn test_open_twice_reuses_database() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp).await;
        store
            .append(&sample_record("8.8.8.8", "Chrome", 1))
            .await
            .unwrap();
        drop(store);

        let reopened = open_store(&temp).await;
        assert_eq!(reopened.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_embedded_migrations_applied() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp).await;

        let versions: Vec<i64> =
            sqlx::query_scalar("SELECT version FROM _sqlx_migrations ORDER BY version")
                .fetch_all(&store.pool)
                .await
                .unwrap();
        assert_eq!(versions, vec![1]);
    }

    #[tokio::test]
    async fn test_round_trip_ordering() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp).await;
        for hour in 0..4 {
            store
                .append(&sample_record("8.8.8.8", "Chrome", hour))
                .await
                .unwrap();
        }

        let recent = store.list_recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].session_id, "sess_test_3");

        let all = store.all().await.unwrap();
        assert_eq!(all.first().unwrap().session_id, "sess_test_0");
        assert_eq!(all[0], sample_record("8.8.8.8", "Chrome", 0));
    }

    #[tokio::test]
    async fn test_count_by_uses_columns() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp).await;
        for (ip, browser) in [("1.1.1.1", "Chrome"), ("2.2.2.2", "Safari"), ("3.3.3.3", "Chrome")] {
            store.append(&sample_record(ip, browser, 1)).await.unwrap();
        }
        let counts = store.count_by(VisitorField::Browser).await.unwrap();
        assert_eq!(counts.get("Chrome"), Some(&2));

        let countries = store.count_by(VisitorField::Country).await.unwrap();
        assert_eq!(countries.get("Unknown"), Some(&3));
    }

    #[tokio::test]
    async fn test_clear() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp).await;
        store
            .append(&sample_record("8.8.8.8", "Chrome", 1))
            .await
            .unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.list_recent(10).await.unwrap().is_empty());
    }
}
