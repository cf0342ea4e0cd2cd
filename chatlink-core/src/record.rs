//! Verification record and the identifiers it links together
//!
//! A [`VerificationRecord`] maps a short [`VerificationCode`] to the [`ChatId`] of the
//! conversation that requested it. Records carry their own expiry so readers can treat
//! stale entries as absent even when a store keeps them around.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ValidationError};

/// Identifier of a chat session on the messaging platform.
///
/// Telegram uses signed 64-bit integers, other platforms use strings. The value is
/// serialized untagged so a numeric id stays a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatId::Numeric(id) => write!(f, "{id}"),
            ChatId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        ChatId::Numeric(id)
    }
}

impl From<&str> for ChatId {
    fn from(id: &str) -> Self {
        ChatId::Text(id.to_string())
    }
}

impl From<String> for ChatId {
    fn from(id: String) -> Self {
        ChatId::Text(id)
    }
}

/// Code entered by the user in the companion application, used as HMAC input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActivationCode(String);

impl ActivationCode {
    /// Trim and uppercase a raw activation code.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(ValidationError::MissingActivationCode);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActivationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Short uppercase hexadecimal code shown to the user and used as the store key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Normalize a user-supplied code. Lookups are case-insensitive.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(ValidationError::MissingCode);
        }
        Ok(Self(normalized))
    }

    pub(crate) fn from_digest_prefix(bytes: &[u8]) -> Self {
        Self(hex::encode_upper(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VerificationCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub chat_id: ChatId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// `from + ttl`, or an error when the result is outside the representable range.
pub fn expiry_after(from: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, ConfigError> {
    from.checked_add_signed(ttl)
        .ok_or_else(|| ConfigError::Invalid {
            field: "ttl".to_string(),
            reason: format!("expiry {} seconds after {from} is out of range", ttl.num_seconds()),
        })
}

impl VerificationRecord {
    pub fn new(
        chat_id: ChatId,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            chat_id,
            issued_at,
            expires_at: expiry_after(issued_at, ttl)?,
        })
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
