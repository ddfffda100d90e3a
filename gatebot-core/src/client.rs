//! Capability interface of the messaging backend.
//!
//! [`BotClient`] is transport-agnostic; gatebot-telegram implements it via teloxide and tests
//! substitute a recording mock.

use crate::error::Result;
use crate::types::{BotCredential, InboundMessage, MembershipStatus, MessageId};
use async_trait::async_trait;
use std::sync::Arc;

/// Identity reported by the backend once a credential is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: i64,
    pub username: Option<String>,
}

/// Markup attached to an outgoing text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyMarkup {
    /// A single inline button that opens `url`.
    UrlButton { label: String, url: String },
}

/// One authenticated connection for a single bot credential.
#[async_trait]
pub trait BotClient: Send + Sync {
    /// Authenticates and prepares to receive updates.
    async fn connect(&self) -> Result<BotIdentity>;
    /// Releases the connection. Must be idempotent.
    async fn disconnect(&self) -> Result<()>;
    /// Waits for the next batch of inbound messages (one long-poll round). Non-message updates are skipped.
    async fn poll_updates(&self) -> Result<Vec<InboundMessage>>;
    /// Sends `text` to `chat_id` with optional markup; returns the new message id.
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&ReplyMarkup>,
    ) -> Result<MessageId>;
    /// Forwards `message` to `destination_chat_id`; returns the id of the forwarded copy.
    async fn forward_message(
        &self,
        message: &InboundMessage,
        destination_chat_id: i64,
    ) -> Result<MessageId>;
    /// Looks up the membership of `user_id` in `channel_id`.
    async fn get_chat_member(&self, channel_id: i64, user_id: i64) -> Result<MembershipStatus>;
    /// Returns a join link for `channel_id`. The bot needs invite rights in that channel.
    async fn export_invite_link(&self, channel_id: i64) -> Result<String>;
}

/// Builds a client for a credential. Must not perform network I/O; `connect` does that.
pub trait ClientFactory: Send + Sync {
    fn build(&self, credential: &BotCredential) -> Result<Arc<dyn BotClient>>;
}
