use async_trait::async_trait;
use chatlink_core::{Error, Notifier, OutboundMessage};

/// Notifier that only writes outbound messages to the log.
///
/// Meant for local development and dry runs where no bot token is available.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: OutboundMessage) -> Result<(), Error> {
        tracing::info!(
            chat_id = %message.chat_id,
            markdown = message.markdown,
            text = %message.text,
            "Outbound chat message (not delivered)"
        );
        Ok(())
    }
}
