use chrono::{Duration, Utc};

use crate::{
    Error,
    error::StorageError,
    record::{VerificationCode, VerificationRecord},
    store::ExpiringStore,
};

/// Repository for verification records on top of an [`ExpiringStore`]
///
/// Records are stored as JSON under their verification code. A record whose
/// `expires_at` has passed is reported as absent even if the store still returns it.
pub struct VerificationRepository<S: ExpiringStore> {
    store: S,
}

impl<S: ExpiringStore> VerificationRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn save(
        &self,
        code: &VerificationCode,
        record: &VerificationRecord,
        ttl: Duration,
    ) -> Result<(), Error> {
        let value = serde_json::to_string(record).map_err(|e| StorageError::Corrupt {
            key: code.to_string(),
            reason: e.to_string(),
        })?;
        self.store.put(code.as_str(), value, ttl).await
    }

    pub async fn find(&self, code: &VerificationCode) -> Result<Option<VerificationRecord>, Error> {
        let Some(value) = self.store.get(code.as_str()).await? else {
            return Ok(None);
        };

        let record: VerificationRecord =
            serde_json::from_str(&value).map_err(|e| StorageError::Corrupt {
                key: code.to_string(),
                reason: e.to_string(),
            })?;

        if record.is_expired_at(Utc::now()) {
            tracing::debug!(%code, "Store returned an expired verification record");
            return Ok(None);
        }

        Ok(Some(record))
    }

    pub async fn purge_expired(&self) -> Result<u64, Error> {
        self.store.purge_expired().await
    }
}
