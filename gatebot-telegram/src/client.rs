//! [`TelegramClient`]: one Bot API connection per credential, implementing [`BotClient`].

use async_trait::async_trait;
use gatebot_core::{
    BotClient, BotCredential, BotIdentity, ClientFactory, GatebotError, HandlerError,
    InboundMessage, MembershipStatus, MessageId, ReplyMarkup, Result,
};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use teloxide::{
    prelude::*,
    types::{AllowedUpdate, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, UpdateKind, UserId},
};
use tracing::{debug, info, instrument, warn};

use crate::adapters::{membership_from_kind, TelegramMessageWrapper};
use crate::config::TelegramConfig;

/// HTTP timeout margin on top of the long-poll timeout, so the client does not abort a poll Telegram is still holding.
const HTTP_TIMEOUT_MARGIN_SECS: u64 = 15;

/// Telegram Bot API client for a single bot token.
pub struct TelegramClient {
    session_name: String,
    bot: teloxide::Bot,
    poll_timeout_secs: u32,
    offset: AtomicI32,
    connected: AtomicBool,
}

impl TelegramClient {
    /// Creates a client for `credential`. No network I/O until [`BotClient::connect`].
    pub fn new(credential: &BotCredential, config: &TelegramConfig) -> Result<Self> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(Duration::from_secs(
                u64::from(config.poll_timeout_secs) + HTTP_TIMEOUT_MARGIN_SECS,
            ))
            .build()
            .map_err(|e| GatebotError::Config(format!("Failed to build HTTP client: {}", e)))?;
        let bot = teloxide::Bot::with_client(credential.bot_token.clone(), client);
        let bot = match config.telegram_api_url.as_deref() {
            Some(url_str) => {
                let url = reqwest::Url::parse(url_str).map_err(|e| {
                    GatebotError::Config(format!("Invalid TELEGRAM_API_URL {}: {}", url_str, e))
                })?;
                bot.set_api_url(url)
            }
            None => bot,
        };
        Ok(Self::from_bot(
            &credential.session_name,
            bot,
            config.poll_timeout_secs,
        ))
    }

    /// Wraps an existing teloxide Bot.
    pub fn from_bot(session_name: &str, bot: teloxide::Bot, poll_timeout_secs: u32) -> Self {
        Self {
            session_name: session_name.to_string(),
            bot,
            poll_timeout_secs,
            offset: AtomicI32::new(0),
            connected: AtomicBool::new(false),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl TelegramClient {
    /// Telegram only drops delivered updates once a later getUpdates carries their offset.
    /// Best-effort: a failure here means the last batch may be delivered again after restart.
    async fn confirm_offset(&self) {
        let offset = self.offset.load(Ordering::SeqCst);
        if offset == 0 {
            return;
        }
        match self.bot.get_updates().offset(offset).timeout(0).limit(1).await {
            Ok(_) => debug!(session = %self.session_name, offset, "Confirmed update offset"),
            Err(e) => {
                warn!(session = %self.session_name, offset, error = %e, "Failed to confirm update offset")
            }
        }
    }
}

fn to_keyboard(markup: &ReplyMarkup) -> Result<InlineKeyboardMarkup> {
    match markup {
        ReplyMarkup::UrlButton { label, url } => {
            let url = reqwest::Url::parse(url)
                .map_err(|e| GatebotError::Send(format!("Invalid button url {}: {}", url, e)))?;
            Ok(InlineKeyboardMarkup::new(vec![vec![
                InlineKeyboardButton::url(label.clone(), url),
            ]]))
        }
    }
}

#[async_trait]
impl BotClient for TelegramClient {
    #[instrument(skip(self), fields(session = %self.session_name))]
    async fn connect(&self) -> Result<BotIdentity> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| GatebotError::Connect(e.to_string()))?;
        // Long polling does not work while a webhook is registered.
        self.bot
            .delete_webhook()
            .await
            .map_err(|e| GatebotError::Connect(e.to_string()))?;
        self.connected.store(true, Ordering::SeqCst);

        let identity = BotIdentity {
            id: me.user.id.0 as i64,
            username: me.user.username.clone(),
        };
        info!(bot_id = identity.id, username = ?identity.username, "Telegram bot connected");
        Ok(identity)
    }

    async fn disconnect(&self) -> Result<()> {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.confirm_offset().await;
            info!(session = %self.session_name, "Telegram bot disconnected");
        }
        Ok(())
    }

    async fn poll_updates(&self) -> Result<Vec<InboundMessage>> {
        if !self.is_connected() {
            return Err(HandlerError::NotConnected.into());
        }
        let updates = self
            .bot
            .get_updates()
            .offset(self.offset.load(Ordering::SeqCst))
            .timeout(self.poll_timeout_secs)
            .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::ChannelPost])
            .await
            .map_err(|e| GatebotError::Connect(e.to_string()))?;

        let mut messages = Vec::with_capacity(updates.len());
        for update in updates {
            self.offset.store(update.id.as_offset(), Ordering::SeqCst);
            match update.kind {
                UpdateKind::Message(msg) | UpdateKind::ChannelPost(msg) => {
                    messages.push(TelegramMessageWrapper(&msg).to_inbound())
                }
                other => debug!(session = %self.session_name, "ignoring non-message update: {other:?}"),
            }
        }
        Ok(messages)
    }

    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&ReplyMarkup>,
    ) -> Result<MessageId> {
        let mut request = self.bot.send_message(ChatId(chat_id), text.to_string());
        if let Some(markup) = markup {
            request = request.reply_markup(to_keyboard(markup)?);
        }
        let sent = request
            .await
            .map_err(|e| GatebotError::Send(e.to_string()))?;
        Ok(sent.id.0)
    }

    async fn forward_message(
        &self,
        message: &InboundMessage,
        destination_chat_id: i64,
    ) -> Result<MessageId> {
        let forwarded = self
            .bot
            .forward_message(
                ChatId(destination_chat_id),
                ChatId(message.chat_id),
                teloxide::types::MessageId(message.id),
            )
            .await
            .map_err(|e| GatebotError::Forward(e.to_string()))?;
        Ok(forwarded.id.0)
    }

    async fn get_chat_member(&self, channel_id: i64, user_id: i64) -> Result<MembershipStatus> {
        let member = self
            .bot
            .get_chat_member(ChatId(channel_id), UserId(user_id as u64))
            .await
            .map_err(|e| GatebotError::Lookup(e.to_string()))?;
        Ok(membership_from_kind(&member.kind))
    }

    async fn export_invite_link(&self, channel_id: i64) -> Result<String> {
        self.bot
            .export_chat_invite_link(ChatId(channel_id))
            .await
            .map_err(|e| GatebotError::Lookup(e.to_string()))
    }
}

/// Builds [`TelegramClient`]s sharing one transport config.
#[derive(Debug, Clone, Default)]
pub struct TelegramClientFactory {
    config: TelegramConfig,
}

impl TelegramClientFactory {
    pub fn new(config: TelegramConfig) -> Self {
        Self { config }
    }
}

impl ClientFactory for TelegramClientFactory {
    fn build(&self, credential: &BotCredential) -> Result<Arc<dyn BotClient>> {
        Ok(Arc::new(TelegramClient::new(credential, &self.config)?))
    }
}
