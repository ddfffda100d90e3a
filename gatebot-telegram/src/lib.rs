//! # gatebot-telegram
//!
//! Telegram transport for gatebot: [`TelegramClient`] implements [`gatebot_core::BotClient`] over the
//! Bot API (long polling via getUpdates), [`TelegramClientFactory`] builds one client per credential,
//! and the adapters convert teloxide types into core types. No handler or gate logic lives here.

mod adapters;
mod client;
mod config;

pub use adapters::{membership_from_kind, TelegramMessageWrapper, TelegramUserWrapper};
pub use client::{TelegramClient, TelegramClientFactory};
pub use config::TelegramConfig;
