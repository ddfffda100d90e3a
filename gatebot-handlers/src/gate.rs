//! Subscription gate: user-facing replies require membership in the auth channel.
//!
//! Decision table:
//! - channel unset -> [`GateDecision::Disabled`] (warning logged, no lookup);
//! - owner / administrator / member -> [`GateDecision::Allowed`];
//! - left / kicked / restricted / unknown -> [`GateDecision::Blocked`], join prompt sent to the user;
//! - lookup error -> [`GateDecision::FailOpen`] (error logged). Availability wins over enforcement.

use gatebot_core::{BotClient, ChannelRef, MembershipStatus, ReplyMarkup};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info, instrument, warn};

use crate::texts::Texts;

/// Result of one gate check. Only [`GateDecision::Blocked`] refuses the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Disabled,
    Allowed(MembershipStatus),
    Blocked(MembershipStatus),
    FailOpen(String),
}

impl GateDecision {
    pub fn permits(&self) -> bool {
        !matches!(self, GateDecision::Blocked(_))
    }
}

pub struct SubscriptionGate {
    session: String,
    client: Arc<dyn BotClient>,
    channel: ChannelRef,
    configured_link: Option<String>,
    exported_link: OnceCell<String>,
    prompt_text: String,
    button_label: String,
}

impl SubscriptionGate {
    pub fn new(
        session: &str,
        client: Arc<dyn BotClient>,
        channel: ChannelRef,
        join_link: Option<String>,
        texts: &Texts,
    ) -> Self {
        Self {
            session: session.to_string(),
            client,
            channel,
            configured_link: join_link.filter(|l| !l.trim().is_empty()),
            exported_link: OnceCell::new(),
            prompt_text: texts.gate_prompt.clone(),
            button_label: texts.gate_button.clone(),
        }
    }

    /// Checks `user_id` against the auth channel with a fresh lookup.
    /// On `Blocked` the join prompt has been sent (or its failure logged) before returning.
    #[instrument(skip(self), fields(session = %self.session))]
    pub async fn check(&self, user_id: i64) -> GateDecision {
        let Some(channel_id) = self.channel.id() else {
            warn!(user_id, "AUTH_CHANNEL not set, subscription gate disabled");
            return GateDecision::Disabled;
        };

        let status = match self.client.get_chat_member(channel_id, user_id).await {
            Ok(status) => status,
            Err(e) => {
                error!(
                    user_id,
                    channel_id,
                    error = %e,
                    "Membership lookup failed, allowing user (is the bot an admin of the channel?)"
                );
                return GateDecision::FailOpen(e.to_string());
            }
        };

        if status.is_subscribed() {
            return GateDecision::Allowed(status);
        }

        info!(user_id, channel_id, status = %status, "User not subscribed, sending join prompt");
        self.send_prompt(user_id, channel_id).await;
        GateDecision::Blocked(status)
    }

    async fn send_prompt(&self, user_id: i64, channel_id: i64) {
        let markup = self.join_link(channel_id).await.map(|url| ReplyMarkup::UrlButton {
            label: self.button_label.clone(),
            url,
        });
        if let Err(e) = self
            .client
            .send_text(user_id, &self.prompt_text, markup.as_ref())
            .await
        {
            error!(user_id, error = %e, "Failed to send join prompt");
        }
    }

    /// Configured link, else the backend's invite link (looked up once per gate). `None` sends the prompt without a button.
    async fn join_link(&self, channel_id: i64) -> Option<String> {
        if let Some(link) = &self.configured_link {
            return Some(link.clone());
        }
        match self
            .exported_link
            .get_or_try_init(|| self.client.export_invite_link(channel_id))
            .await
        {
            Ok(link) => Some(link.clone()),
            Err(e) => {
                warn!(channel_id, error = %e, "No join link available, prompt sent without button");
                None
            }
        }
    }
}
