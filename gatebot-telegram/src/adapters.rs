//! Adapters from Telegram (teloxide) types to gatebot_core types.

use gatebot_core::{ChatKind, InboundMessage, MembershipStatus, Sender};
use teloxide::types::ChatMemberKind;

/// Wraps a teloxide User for conversion to a core [`Sender`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> TelegramUserWrapper<'a> {
    pub fn to_sender(&self) -> Sender {
        Sender {
            id: self.0.id.0 as i64,
            display_name: self.0.first_name.clone(),
            username: self.0.username.clone(),
        }
    }
}

/// Wraps a teloxide Message for conversion to a core [`InboundMessage`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> TelegramMessageWrapper<'a> {
    pub fn to_inbound(&self) -> InboundMessage {
        let msg = self.0;
        InboundMessage {
            id: msg.id.0,
            chat_id: msg.chat.id.0,
            chat_kind: self.chat_kind(),
            text: msg.text().map(str::to_string),
            sender: self.sender(),
            date: msg.date,
        }
    }

    fn chat_kind(&self) -> ChatKind {
        let chat = &self.0.chat;
        if chat.is_private() {
            ChatKind::Private
        } else if chat.is_channel() {
            ChatKind::Channel
        } else {
            ChatKind::Group
        }
    }

    /// User sender if present; channel posts and anonymous admins fall back to the sending chat.
    fn sender(&self) -> Sender {
        if let Some(user) = self.0.from.as_ref() {
            return TelegramUserWrapper(user).to_sender();
        }
        let chat = self.0.sender_chat.as_ref().unwrap_or(&self.0.chat);
        Sender {
            id: chat.id.0,
            display_name: chat.title().unwrap_or("unknown").to_string(),
            username: chat.username().map(str::to_string),
        }
    }
}

/// Maps a chat member record to the core status.
pub fn membership_from_kind(kind: &ChatMemberKind) -> MembershipStatus {
    if kind.is_owner() {
        MembershipStatus::Owner
    } else if kind.is_administrator() {
        MembershipStatus::Administrator
    } else if kind.is_restricted() {
        MembershipStatus::Restricted
    } else if kind.is_left() {
        MembershipStatus::Left
    } else if kind.is_banned() {
        MembershipStatus::Kicked
    } else if kind.is_member() {
        MembershipStatus::Member
    } else {
        MembershipStatus::Unknown
    }
}
