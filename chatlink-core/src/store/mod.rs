//! Expiring key-value storage
//!
//! The relay only needs two primitives from its backing store: an atomic write with an
//! expiry and a read. Absence covers both "never written" and "expired" so callers never
//! need to distinguish the two.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;

use crate::Error;

pub use memory::InMemoryStore;

#[async_trait]
pub trait ExpiringStore: Send + Sync + 'static {
    /// Store `value` under `key`, replacing any previous value. The entry becomes
    /// unreadable once `ttl` has elapsed.
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), Error>;

    /// Read the live value under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Remove expired entries, returning how many were dropped.
    ///
    /// Stores that expire entries on their own can keep the default.
    async fn purge_expired(&self) -> Result<u64, Error> {
        Ok(0)
    }

    /// Prepare the backing schema, if the store has one. Must be idempotent.
    async fn migrate(&self) -> Result<(), Error> {
        Ok(())
    }
}

#[async_trait]
impl<T: ExpiringStore + ?Sized> ExpiringStore for Arc<T> {
    async fn migrate(&self) -> Result<(), Error> {
        (**self).migrate().await
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), Error> {
        (**self).put(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        (**self).get(key).await
    }

    async fn purge_expired(&self) -> Result<u64, Error> {
        (**self).purge_expired().await
    }
}
