use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, error::NotificationError, record::ChatId};

/// A message to deliver to a chat on the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
    /// Render `text` with the platform's markdown dialect.
    pub markdown: bool,
}

impl OutboundMessage {
    pub fn plain(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            markdown: false,
        }
    }

    pub fn markdown(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            markdown: true,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn send(&self, message: OutboundMessage) -> Result<(), Error>;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn send(&self, message: OutboundMessage) -> Result<(), Error> {
        (**self).send(message).await
    }
}

/// Notifier that keeps every message in memory instead of delivering it.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, message: OutboundMessage) -> Result<(), Error> {
        self.sent
            .lock()
            .map_err(|e| NotificationError::Delivery(e.to_string()))?
            .push(message);
        Ok(())
    }
}
