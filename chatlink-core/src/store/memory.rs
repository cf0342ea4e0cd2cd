use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::{Error, record::expiry_after};

use super::ExpiringStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Process-local store backed by a concurrent hash map.
///
/// Expired entries are dropped lazily on read and by [`ExpiringStore::purge_expired`].
/// Contents do not survive a restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, Entry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ExpiringStore for InMemoryStore {
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), Error> {
        let entry = Entry {
            value,
            expires_at: expiry_after(Utc::now(), ttl)?,
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let now = Utc::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        // The shard guard from `get` is released above; removing while holding it deadlocks.
        self.entries
            .remove_if(key, |_, entry| entry.is_expired_at(now));
        Ok(None)
    }

    async fn purge_expired(&self) -> Result<u64, Error> {
        let now = Utc::now();
        let mut removed = 0u64;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
