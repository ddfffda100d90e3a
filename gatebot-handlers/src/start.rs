//! `/start` in a private chat: greet the sender once the gate lets them through.

use async_trait::async_trait;
use gatebot_core::{BotClient, InboundMessage, Result};
use handler_groups::Action;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::gate::SubscriptionGate;
use crate::texts::Texts;

pub struct StartAction {
    client: Arc<dyn BotClient>,
    gate: Arc<SubscriptionGate>,
    template: Texts,
}

impl StartAction {
    pub fn new(client: Arc<dyn BotClient>, gate: Arc<SubscriptionGate>, texts: &Texts) -> Self {
        Self {
            client,
            gate,
            template: texts.clone(),
        }
    }
}

#[async_trait]
impl Action for StartAction {
    #[instrument(skip(self, message), fields(user_id = message.sender.id))]
    async fn run(&self, message: &InboundMessage) -> Result<()> {
        let decision = self.gate.check(message.sender.id).await;
        if !decision.permits() {
            info!(decision = ?decision, "Start blocked by subscription gate");
            return Ok(());
        }

        let text = self.template.start_for(&message.sender.display_name);
        let sent = self.client.send_text(message.chat_id, &text, None).await?;
        info!(chat_id = message.chat_id, sent_message_id = sent, "Sent start greeting");
        Ok(())
    }
}
