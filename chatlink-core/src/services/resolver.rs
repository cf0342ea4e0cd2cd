use std::sync::Arc;

use crate::{
    Error,
    error::{LookupError, ValidationError},
    record::{VerificationCode, VerificationRecord},
    repository::VerificationRepository,
    store::ExpiringStore,
};

/// Service resolving verification codes back to chat identifiers
///
/// Lookups have no side effects: a record can be read any number of times until it
/// expires.
pub struct ResolverService<S: ExpiringStore> {
    repository: Arc<VerificationRepository<S>>,
}

impl<S: ExpiringStore> ResolverService<S> {
    pub fn new(repository: Arc<VerificationRepository<S>>) -> Self {
        Self { repository }
    }

    /// Look up a raw, user-supplied verification code.
    ///
    /// # Errors
    ///
    /// * [`ValidationError::MissingCode`] when `raw_code` is absent or blank
    /// * [`LookupError::NotFound`] when the code was never issued or has expired
    pub async fn resolve(&self, raw_code: Option<&str>) -> Result<VerificationRecord, Error> {
        let raw_code = raw_code.ok_or(ValidationError::MissingCode)?;
        let code = VerificationCode::parse(raw_code)?;

        match self.repository.find(&code).await? {
            Some(record) => Ok(record),
            None => {
                tracing::debug!(%code, "Verification code not found");
                Err(LookupError::NotFound.into())
            }
        }
    }
}
