//! Transport config: Bot API base URL and long-poll timeout.
//! Loaded from TELEGRAM_API_URL (or TELOXIDE_API_URL) and POLL_TIMEOUT_SECS.

use anyhow::Result;
use std::env;

/// Default getUpdates long-poll timeout, seconds.
pub const DEFAULT_POLL_TIMEOUT_SECS: u32 = 30;

/// Telegram transport config shared by every session.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub telegram_api_url: Option<String>,
    pub poll_timeout_secs: u32,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            telegram_api_url: None,
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
        }
    }
}

impl TelegramConfig {
    /// Loads from environment; unset values take defaults.
    pub fn from_env() -> Result<Self> {
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok()
            .filter(|s| !s.trim().is_empty());
        let poll_timeout_secs = env::var("POLL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS);
        let config = Self {
            telegram_api_url,
            poll_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Fails if the API URL is set but not a valid URL.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        Ok(())
    }
}
