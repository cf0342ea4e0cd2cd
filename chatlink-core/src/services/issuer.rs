//! Code issuance
//!
//! Turns an inbound activation command into a stored verification record and tells the
//! originating chat which code to enter in the companion application.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    Error,
    command::{ParsedCommand, parse_command},
    config::ChatLinkConfig,
    crypto::derive_verification_code,
    messages,
    notifier::{Notifier, OutboundMessage},
    record::{ActivationCode, ChatId, VerificationCode, VerificationRecord},
    repository::VerificationRepository,
    store::ExpiringStore,
};

/// What the issuer did with an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueOutcome {
    /// A record was stored and the confirmation sent.
    Issued {
        code: VerificationCode,
        record: VerificationRecord,
    },
    /// The command had no activation code; the chat was told how to use it.
    UsageError,
    /// The message was not an activation command.
    Ignored,
}

/// Service issuing verification codes for inbound chat events
pub struct IssuerService<S: ExpiringStore, N: Notifier> {
    repository: Arc<VerificationRepository<S>>,
    notifier: Arc<N>,
    config: Arc<ChatLinkConfig>,
}

impl<S: ExpiringStore, N: Notifier> IssuerService<S, N> {
    pub fn new(
        repository: Arc<VerificationRepository<S>>,
        notifier: Arc<N>,
        config: Arc<ChatLinkConfig>,
    ) -> Self {
        Self {
            repository,
            notifier,
            config,
        }
    }

    /// Handle the text of an inbound message from `chat_id`.
    ///
    /// Errors are returned, never raised to the chat: the caller decides how to surface
    /// them to the transport.
    pub async fn issue(&self, chat_id: ChatId, text: &str) -> Result<IssueOutcome, Error> {
        match parse_command(text, self.config.commands()) {
            ParsedCommand::NotACommand => Ok(IssueOutcome::Ignored),
            ParsedCommand::MissingArgument { command } => {
                tracing::debug!(%chat_id, %command, "Activation command without code");
                self.notifier
                    .send(OutboundMessage::plain(chat_id, messages::usage(&command)))
                    .await?;
                Ok(IssueOutcome::UsageError)
            }
            ParsedCommand::Activate(activation) => self.activate(chat_id, &activation).await,
        }
    }

    /// Compute the verification code for an activation code without storing anything.
    pub fn derive(&self, activation: &ActivationCode) -> Result<VerificationCode, Error> {
        Ok(derive_verification_code(
            self.config.secret().expose(),
            activation,
        )?)
    }

    async fn activate(
        &self,
        chat_id: ChatId,
        activation: &ActivationCode,
    ) -> Result<IssueOutcome, Error> {
        let code = self.derive(activation)?;
        let ttl = self.config.ttl();
        let record = VerificationRecord::new(chat_id.clone(), Utc::now(), ttl)?;

        self.repository.save(&code, &record, ttl).await?;

        self.notifier
            .send(OutboundMessage::markdown(
                chat_id.clone(),
                messages::confirmation(&code, ttl),
            ))
            .await?;

        tracing::info!(%chat_id, %code, expires_at = %record.expires_at, "Issued verification code");

        Ok(IssueOutcome::Issued { code, record })
    }
}
