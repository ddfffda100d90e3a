//! Runner config, loaded from environment (call `dotenvy::dotenv()` first).
//!
//! BOTS_FILE and LOCALE_FILE point at the credentials list and the translation data; the channel
//! ids and log file are plain variables. CLI flags may override both file paths.

use anyhow::Result;
use gatebot_core::{ChannelRef, GatebotError};
use gatebot_handlers::{Channels, Texts};
use gatebot_telegram::TelegramConfig;
use std::env;
use std::path::{Path, PathBuf};

use crate::credentials::{load_credentials, RawCredential};

pub const DEFAULT_BOTS_FILE: &str = "bots.json";
pub const DEFAULT_LOCALE_FILE: &str = "locales/en.json";
pub const DEFAULT_LOG_FILE: &str = "logs/gatebot.log";

/// Everything the runner needs besides the shutdown signal.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// BOTS_FILE
    pub bots_file: PathBuf,
    /// LOCALE_FILE
    pub locale_file: PathBuf,
    /// LOG_FILE
    pub log_file: String,
    /// LOG_CHANNEL_ID, AUTH_CHANNEL, AUTH_CHANNEL_LINK
    pub channels: Channels,
    pub telegram: TelegramConfig,
}

impl RunnerConfig {
    /// Loads from environment. `bots_file` / `locale_file` override BOTS_FILE / LOCALE_FILE when given.
    pub fn load(bots_file: Option<PathBuf>, locale_file: Option<PathBuf>) -> Result<Self> {
        let bots_file = bots_file
            .or_else(|| env::var("BOTS_FILE").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BOTS_FILE));
        let locale_file = locale_file
            .or_else(|| env::var("LOCALE_FILE").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCALE_FILE));
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());

        let channels = Channels {
            log_channel: ChannelRef::parse(env::var("LOG_CHANNEL_ID").ok().as_deref()),
            auth_channel: ChannelRef::parse(env::var("AUTH_CHANNEL").ok().as_deref()),
            auth_channel_link: env::var("AUTH_CHANNEL_LINK")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        };

        Ok(Self {
            bots_file,
            locale_file,
            log_file,
            channels,
            telegram: TelegramConfig::from_env()?,
        })
    }

    /// Reads the credentials list named by `bots_file`.
    pub fn credentials(&self) -> gatebot_core::Result<Vec<RawCredential>> {
        load_credentials(&self.bots_file)
    }

    /// Reads the translation data named by `locale_file`.
    pub fn texts(&self) -> gatebot_core::Result<Texts> {
        load_texts(&self.locale_file)
    }
}

/// Reads translation data. Missing or malformed data is a configuration error.
pub fn load_texts(path: &Path) -> gatebot_core::Result<Texts> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        GatebotError::Config(format!(
            "Cannot read translation file {}: {}",
            path.display(),
            e
        ))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        GatebotError::Config(format!(
            "Malformed translation file {}: {}",
            path.display(),
            e
        ))
    })
}
