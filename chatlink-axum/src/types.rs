use chatlink_core::ChatId;
use serde::{Deserialize, Serialize};

/// The subset of a Telegram `Update` the relay reads. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

impl Update {
    /// Chat and text of the message carried by this update, if it has both.
    pub fn chat_event(&self) -> Option<(ChatId, &str)> {
        let message = self.message.as_ref()?;
        let text = message.text.as_deref()?;
        Some((message.chat.id.clone(), text))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupQuery {
    pub codigo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatIdResponse {
    pub chat_id: ChatId,
    /// Issuance time in Unix milliseconds.
    pub timestamp: i64,
}
