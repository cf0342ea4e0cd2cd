use async_trait::async_trait;
use chatlink_core::{ChatId, Notifier, OutboundMessage};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Result, TelegramConfig, TelegramError};

/// Body of a `sendMessage` call.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a ChatId,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
}

/// Body of a `setWebhook` call.
#[derive(Debug, Clone, Serialize)]
pub struct SetWebhookRequest<'a> {
    pub url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_token: Option<&'a str>,
    pub allowed_updates: &'a [&'a str],
}

/// Envelope every Bot API method responds with.
#[derive(Debug, Clone, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

/// Client for the subset of the Telegram Bot API the relay uses.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    config: TelegramConfig,
    http: reqwest::Client,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self> {
        let http = reqwest::ClientBuilder::new()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TelegramError::Transport(e.without_url()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    pub async fn send_message(&self, message: &OutboundMessage) -> Result<()> {
        let request = SendMessageRequest {
            chat_id: &message.chat_id,
            text: &message.text,
            parse_mode: message.markdown.then_some("Markdown"),
        };
        let _sent: serde_json::Value = self.call("sendMessage", &request).await?;
        Ok(())
    }

    /// Point the bot's webhook at `url`. Telegram will echo `secret_token` in the
    /// `X-Telegram-Bot-Api-Secret-Token` header of every update.
    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<()> {
        let request = SetWebhookRequest {
            url,
            secret_token,
            allowed_updates: &["message"],
        };
        let _accepted: bool = self.call("setWebhook", &request).await?;
        Ok(())
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.config.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                tracing::error!(method, error = %e, "Bot API request failed");
                TelegramError::Transport(e)
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TelegramError::Transport(e.without_url()))?;

        let envelope: ApiResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TelegramError::Api {
                    method: method.to_string(),
                    description: format!("HTTP {status}"),
                });
            }
            Err(e) => return Err(e.into()),
        };

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => {
                let description = description.unwrap_or_else(|| format!("HTTP {status}"));
                tracing::warn!(method, %status, %description, "Bot API returned an error");
                Err(TelegramError::Api {
                    method: method.to_string(),
                    description,
                })
            }
        }
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, message: OutboundMessage) -> std::result::Result<(), chatlink_core::Error> {
        self.send_message(&message).await?;
        Ok(())
    }
}
