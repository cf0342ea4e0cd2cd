use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing verification code")]
    MissingCode,

    #[error("Missing activation code")]
    MissingActivationCode,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Verification code not found or expired")]
    NotFound,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Corrupt record under key {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid HMAC key: {0}")]
    InvalidKey(String),
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Rejected by chat platform: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("HMAC secret must not be empty")]
    EmptySecret,

    #[error("Code TTL must be positive, got {0} seconds")]
    NonPositiveTtl(i64),

    #[error("At least one activation command is required")]
    NoCommands,

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Lookup(LookupError::NotFound))
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    pub fn is_notification_error(&self) -> bool {
        matches!(self, Error::Notification(_))
    }
}
