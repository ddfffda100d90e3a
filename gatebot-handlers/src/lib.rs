//! # gatebot-handlers
//!
//! The standard handler set every session gets: [`StartAction`] and [`ReplyAction`] (user-facing,
//! both behind the [`SubscriptionGate`]) and [`LogAction`] (forwards every message to the log channel).
//! [`standard_dispatcher`] assembles them into the two handler groups.

mod forward;
mod gate;
mod reply;
mod start;
mod texts;

pub use forward::LogAction;
pub use gate::{GateDecision, SubscriptionGate};
pub use reply::ReplyAction;
pub use start::StartAction;
pub use texts::Texts;

use gatebot_core::{BotClient, ChannelRef};
use handler_groups::{Dispatcher, Predicate};
use std::sync::Arc;

/// Group for user-facing replies.
pub const REPLY_GROUP: i32 = 1;
/// Group for forwarding to the log channel; sees every message.
pub const LOG_GROUP: i32 = 2;

/// Channels shared read-only by every session.
#[derive(Debug, Clone, Default)]
pub struct Channels {
    pub log_channel: ChannelRef,
    pub auth_channel: ChannelRef,
    /// Join link for the gate button; looked up from the backend when `None`.
    pub auth_channel_link: Option<String>,
}

/// Builds the standard dispatcher for one session:
/// group 1 = `/start` in private chat -> start, non-command private text -> reply;
/// group 2 = every message -> log.
pub fn standard_dispatcher(
    session: &str,
    client: Arc<dyn BotClient>,
    channels: &Channels,
    texts: &Texts,
) -> Dispatcher {
    let gate = Arc::new(SubscriptionGate::new(
        session,
        client.clone(),
        channels.auth_channel,
        channels.auth_channel_link.clone(),
        texts,
    ));

    Dispatcher::new()
        .add_handler(
            REPLY_GROUP,
            Predicate::private_command("start"),
            Arc::new(StartAction::new(client.clone(), gate.clone(), texts)),
        )
        .add_handler(
            REPLY_GROUP,
            Predicate::NonCommandText,
            Arc::new(ReplyAction::new(client.clone(), gate, texts)),
        )
        .add_handler(
            LOG_GROUP,
            Predicate::All,
            Arc::new(LogAction::new(session, client, channels.log_channel)),
        )
}
