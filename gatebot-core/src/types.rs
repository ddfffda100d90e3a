//! Core types: inbound message, sender, chat kind, membership status, credentials and channel refs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix that marks a message text as a bot command.
pub const COMMAND_PREFIX: char = '/';

/// Transport message id (Telegram message ids are 32-bit).
pub type MessageId = i32;

/// Kind of chat a message arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    Private,
    Group,
    Channel,
}

/// Who sent a message: numeric id plus a name suitable for greetings and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: i64,
    pub display_name: String,
    pub username: Option<String>,
}

/// A message delivered to the handlers of one session. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: MessageId,
    pub chat_id: i64,
    pub chat_kind: ChatKind,
    /// `None` for media and service messages.
    pub text: Option<String>,
    pub sender: Sender,
    pub date: DateTime<Utc>,
}

impl InboundMessage {
    pub fn is_private(&self) -> bool {
        self.chat_kind == ChatKind::Private
    }

    /// Text if present and non-empty.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// True when the text starts with [`COMMAND_PREFIX`].
    pub fn is_command(&self) -> bool {
        self.text().is_some_and(|t| t.starts_with(COMMAND_PREFIX))
    }

    /// Command name without prefix and without an `@botname` suffix, e.g. `/start@my_bot arg` -> `start`.
    pub fn command_name(&self) -> Option<&str> {
        let text = self.text()?;
        let head = text.split_whitespace().next()?;
        let name = head.strip_prefix(COMMAND_PREFIX)?;
        name.split('@').next().filter(|n| !n.is_empty())
    }
}

/// Membership of a user in a channel, derived per lookup (never cached).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Owner,
    Administrator,
    Member,
    Left,
    Kicked,
    Restricted,
    /// No membership record, or a status the backend reported that we do not model.
    Unknown,
}

impl MembershipStatus {
    /// Owner, administrator and member count as subscribed; everything else does not.
    pub fn is_subscribed(self) -> bool {
        matches!(
            self,
            MembershipStatus::Owner | MembershipStatus::Administrator | MembershipStatus::Member
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MembershipStatus::Owner => "owner",
            MembershipStatus::Administrator => "administrator",
            MembershipStatus::Member => "member",
            MembershipStatus::Left => "left",
            MembershipStatus::Kicked => "kicked",
            MembershipStatus::Restricted => "restricted",
            MembershipStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bot's credentials. Validated by the runner before a session is built.
#[derive(Clone, PartialEq, Eq)]
pub struct BotCredential {
    /// Unique within a run; used as the session's name in logs.
    pub session_name: String,
    pub api_id: i64,
    pub api_hash: String,
    pub bot_token: String,
}

impl fmt::Debug for BotCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotCredential")
            .field("session_name", &self.session_name)
            .field("api_id", &self.api_id)
            .field("api_hash", &"[REDACTED]")
            .field("bot_token", &"[REDACTED]")
            .finish()
    }
}

/// Reference to a chat used as log destination or required subscription.
/// `Unset` disables the feature that uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelRef {
    #[default]
    Unset,
    Chat(i64),
}

impl ChannelRef {
    /// Sample channel id shipped in example configuration.
    pub const PLACEHOLDER_ID: i64 = -1001234567890;

    /// Parses a configured value. Missing, empty, non-numeric, zero and the placeholder id are `Unset`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
            Some(0) | None => ChannelRef::Unset,
            Some(id) if id == Self::PLACEHOLDER_ID => ChannelRef::Unset,
            Some(id) => ChannelRef::Chat(id),
        }
    }

    pub fn id(self) -> Option<i64> {
        match self {
            ChannelRef::Unset => None,
            ChannelRef::Chat(id) => Some(id),
        }
    }

    pub fn is_set(self) -> bool {
        self.id().is_some()
    }
}
