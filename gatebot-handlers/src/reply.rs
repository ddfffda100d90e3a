//! Non-command text in a private chat: echo it back once the gate lets the sender through.

use async_trait::async_trait;
use gatebot_core::{BotClient, HandlerError, InboundMessage, Result};
use handler_groups::Action;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::gate::SubscriptionGate;
use crate::texts::Texts;

pub struct ReplyAction {
    client: Arc<dyn BotClient>,
    gate: Arc<SubscriptionGate>,
    texts: Texts,
}

impl ReplyAction {
    pub fn new(client: Arc<dyn BotClient>, gate: Arc<SubscriptionGate>, texts: &Texts) -> Self {
        Self {
            client,
            gate,
            texts: texts.clone(),
        }
    }
}

#[async_trait]
impl Action for ReplyAction {
    #[instrument(skip(self, message), fields(user_id = message.sender.id))]
    async fn run(&self, message: &InboundMessage) -> Result<()> {
        let text = message.text().ok_or(HandlerError::NoText)?;

        let decision = self.gate.check(message.sender.id).await;
        if !decision.permits() {
            info!(decision = ?decision, "Reply blocked by subscription gate");
            return Ok(());
        }

        let reply = self.texts.reply_for(text);
        let sent = self.client.send_text(message.chat_id, &reply, None).await?;
        info!(
            chat_id = message.chat_id,
            reply_len = reply.len(),
            sent_message_id = sent,
            "Sent echo reply"
        );
        Ok(())
    }
}
