//! SQLite storage backend for chatlink
//!
//! Implements [`ExpiringStore`] on a single table keyed by verification code. Expiry is
//! enforced on read, [`ExpiringStore::purge_expired`] removes stale rows and
//! [`ExpiringStore::migrate`] creates the schema.
//!
//! ```rust,no_run
//! use chatlink_core::ExpiringStore;
//! use chatlink_storage_sqlite::SqliteStore;
//!
//! # async fn run() -> Result<(), chatlink_core::Error> {
//! let store = SqliteStore::connect("sqlite://chatlink.db").await?;
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

use std::str::FromStr;

use async_trait::async_trait;
use chatlink_core::{Error, ExpiringStore, error::StorageError, record::expiry_after};
use chrono::{Duration, Utc};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS verification_codes (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        expires_at INTEGER NOT NULL
    );
"#;

const CREATE_EXPIRY_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_verification_codes_expires_at
        ON verification_codes (expires_at);
"#;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `url`, creating the file if it does not exist.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Private in-memory database.
    ///
    /// Every SQLite connection to `:memory:` opens its own database, so the pool is pinned
    /// to one connection that is never recycled.
    pub async fn in_memory() -> Result<Self, Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ExpiringStore for SqliteStore {
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), Error> {
        let expires_at = expiry_after(Utc::now(), ttl)?.timestamp_millis();

        sqlx::query(
            r#"
            INSERT INTO verification_codes (key, value, expires_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let now = Utc::now().timestamp_millis();

        let value: Option<String> = sqlx::query_scalar(
            "SELECT value FROM verification_codes WHERE key = ? AND expires_at > ?",
        )
        .bind(key)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(value)
    }

    async fn purge_expired(&self) -> Result<u64, Error> {
        let now = Utc::now().timestamp_millis();

        let result = sqlx::query("DELETE FROM verification_codes WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn migrate(&self) -> Result<(), Error> {
        for statement in [CREATE_TABLE, CREATE_EXPIRY_INDEX] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Migration(e.to_string()))?;
        }
        tracing::debug!("SQLite schema for verification codes is up to date");
        Ok(())
    }
}
