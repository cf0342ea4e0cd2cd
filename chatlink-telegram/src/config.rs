use std::{fmt, time::Duration};

use crate::TelegramError;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `TELEGRAM_BOT_TOKEN` (required), `TELEGRAM_API_BASE` and
    /// `TELEGRAM_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, TelegramError> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| TelegramError::Config("TELEGRAM_BOT_TOKEN is not set".to_string()))?;

        let mut config = Self::new(bot_token);
        if let Ok(api_base) = std::env::var("TELEGRAM_API_BASE") {
            config = config.with_api_base(api_base);
        }
        if let Some(timeout) = std::env::var("TELEGRAM_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse().ok())
        {
            config = config.with_timeout(Duration::from_secs(timeout));
        }
        Ok(config)
    }

    /// URL of a Bot API method for this bot.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}
