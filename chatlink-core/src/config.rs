use std::fmt;

use chrono::Duration;

use crate::error::ConfigError;

/// Default lifetime of a verification record (10 minutes).
pub const DEFAULT_CODE_TTL: Duration = Duration::seconds(600);

/// Longest accepted lifetime of a verification record (one year).
pub const MAX_CODE_TTL: Duration = Duration::seconds(365 * 24 * 60 * 60);

/// Command recognized when none are configured.
pub const DEFAULT_COMMAND: &str = "/start";

/// Server-held key for verification code derivation.
#[derive(Clone)]
pub struct HmacSecret(Vec<u8>);

impl HmacSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        Ok(Self(secret))
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for HmacSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HmacSecret(<redacted>)")
    }
}

/// Settings shared by the issuer and the resolver.
///
/// Constructed once at startup and handed to both services.
#[derive(Debug, Clone)]
pub struct ChatLinkConfig {
    secret: HmacSecret,
    ttl: Duration,
    commands: Vec<String>,
}

impl ChatLinkConfig {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        Ok(Self {
            secret: HmacSecret::new(secret)?,
            ttl: DEFAULT_CODE_TTL,
            commands: vec![DEFAULT_COMMAND.to_string()],
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Result<Self, ConfigError> {
        if ttl <= Duration::zero() {
            return Err(ConfigError::NonPositiveTtl(ttl.num_seconds()));
        }
        if ttl > MAX_CODE_TTL {
            return Err(ConfigError::Invalid {
                field: "ttl".to_string(),
                reason: format!(
                    "{} seconds exceeds the maximum of {} seconds",
                    ttl.num_seconds(),
                    MAX_CODE_TTL.num_seconds()
                ),
            });
        }
        self.ttl = ttl;
        Ok(self)
    }

    pub fn with_commands<I, S>(mut self, commands: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let commands: Vec<String> = commands
            .into_iter()
            .map(Into::into)
            .map(|command| command.trim().to_string())
            .filter(|command| !command.is_empty())
            .collect();
        if commands.is_empty() {
            return Err(ConfigError::NoCommands);
        }
        self.commands = commands;
        Ok(self)
    }

    pub fn secret(&self) -> &HmacSecret {
        &self.secret
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}
