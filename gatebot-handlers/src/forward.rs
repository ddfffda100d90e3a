//! Forwards every inbound message to the log channel. Never gated.

use async_trait::async_trait;
use gatebot_core::{BotClient, ChannelRef, InboundMessage, Result};
use handler_groups::Action;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct LogAction {
    session: String,
    client: Arc<dyn BotClient>,
    log_channel: ChannelRef,
}

impl LogAction {
    pub fn new(session: &str, client: Arc<dyn BotClient>, log_channel: ChannelRef) -> Self {
        Self {
            session: session.to_string(),
            client,
            log_channel,
        }
    }
}

#[async_trait]
impl Action for LogAction {
    /// One forward attempt; a failure is returned to the dispatcher, which logs it and drops the message.
    #[instrument(skip(self, message), fields(session = %self.session, message_id = message.id))]
    async fn run(&self, message: &InboundMessage) -> Result<()> {
        info!(
            user_id = message.sender.id,
            username = %message.sender.username.as_deref().unwrap_or("unknown"),
            chat_id = message.chat_id,
            chat_kind = ?message.chat_kind,
            has_text = message.text.is_some(),
            date = %message.date.format("%Y-%m-%d %H:%M:%S"),
            "Received message"
        );

        let Some(log_channel) = self.log_channel.id() else {
            debug!("LOG_CHANNEL_ID not set, skipping forward");
            return Ok(());
        };

        let forwarded = self.client.forward_message(message, log_channel).await?;
        debug!(log_channel, forwarded_id = forwarded, "Forwarded message to log channel");
        Ok(())
    }
}
