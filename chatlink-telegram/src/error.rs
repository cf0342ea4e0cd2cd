use chatlink_core::error::NotificationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelegramError {
    /// Built with [`reqwest::Error::without_url`] so the bot token never reaches logs.
    #[error("HTTP transport error: {0}")]
    Transport(reqwest::Error),

    #[error("Bot API rejected {method}: {description}")]
    Api { method: String, description: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TelegramError>;

impl From<TelegramError> for chatlink_core::Error {
    fn from(err: TelegramError) -> Self {
        match err {
            TelegramError::Api { .. } => NotificationError::Rejected(err.to_string()).into(),
            other => NotificationError::Delivery(other.to_string()).into(),
        }
    }
}
