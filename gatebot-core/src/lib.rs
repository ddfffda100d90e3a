//! # gatebot-core
//!
//! Core types and traits shared by every gatebot crate: inbound message and membership types,
//! bot credentials and channel references, the [`BotClient`] capability interface, the error
//! taxonomy, and tracing initialization. Transport-agnostic; the Telegram implementation lives in
//! gatebot-telegram.

pub mod client;
pub mod error;
pub mod logger;
pub mod types;

pub use client::{BotClient, BotIdentity, ClientFactory, ReplyMarkup};
pub use error::{GatebotError, HandlerError, Result};
pub use logger::init_tracing;
pub use types::{
    BotCredential, ChannelRef, ChatKind, InboundMessage, MembershipStatus, MessageId, Sender,
    COMMAND_PREFIX,
};
