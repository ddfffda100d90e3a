//! Bot credential list: loading and validation.
//!
//! Placeholder detection compares against explicit sentinel values; entries failing validation are
//! excluded from the run and reported, never fatal on their own.

use gatebot_core::{BotCredential, GatebotError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::warn;

/// Bot tokens shipped in sample configuration.
pub const TOKEN_PLACEHOLDERS: &[&str] = &["YOUR_BOT_TOKEN", "Place your bot token here"];
/// API hashes shipped in sample configuration.
pub const API_HASH_PLACEHOLDERS: &[&str] = &["YOUR_API_HASH"];
/// API ids shipped in sample configuration.
pub const API_ID_PLACEHOLDERS: &[i64] = &[1234567, 1234567890];

/// One entry of the credentials file, before validation. `api_id` may be a number or a numeric string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCredential {
    pub session_name: String,
    pub api_id: serde_json::Value,
    pub api_hash: String,
    pub bot_token: String,
}

/// Why an entry was left out of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    MissingSessionName,
    DuplicateSessionName,
    InvalidApiId,
    PlaceholderApiHash,
    PlaceholderToken,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExclusionReason::MissingSessionName => "session_name is empty",
            ExclusionReason::DuplicateSessionName => "session_name already used",
            ExclusionReason::InvalidApiId => "api_id is not a real numeric id",
            ExclusionReason::PlaceholderApiHash => "api_hash is empty or a placeholder",
            ExclusionReason::PlaceholderToken => "bot_token is empty or a placeholder",
        };
        f.write_str(s)
    }
}

/// An excluded entry: its position in the file, its name (possibly empty) and the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excluded {
    pub index: usize,
    pub session_name: String,
    pub reason: ExclusionReason,
}

/// Outcome of validation. `valid` keeps file order.
#[derive(Debug, Default)]
pub struct ValidatedCredentials {
    pub valid: Vec<BotCredential>,
    pub excluded: Vec<Excluded>,
}

fn is_placeholder(value: &str, placeholders: &[&str]) -> bool {
    let value = value.trim();
    value.is_empty() || placeholders.iter().any(|p| value == *p)
}

fn parse_api_id(value: &serde_json::Value) -> Option<i64> {
    let id = match value {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (id > 0 && !API_ID_PLACEHOLDERS.contains(&id)).then_some(id)
}

fn check(raw: &RawCredential) -> std::result::Result<BotCredential, ExclusionReason> {
    let session_name = raw.session_name.trim();
    if session_name.is_empty() {
        return Err(ExclusionReason::MissingSessionName);
    }
    if is_placeholder(&raw.bot_token, TOKEN_PLACEHOLDERS) {
        return Err(ExclusionReason::PlaceholderToken);
    }
    let api_id = parse_api_id(&raw.api_id).ok_or(ExclusionReason::InvalidApiId)?;
    if is_placeholder(&raw.api_hash, API_HASH_PLACEHOLDERS) {
        return Err(ExclusionReason::PlaceholderApiHash);
    }
    Ok(BotCredential {
        session_name: session_name.to_string(),
        api_id,
        api_hash: raw.api_hash.trim().to_string(),
        bot_token: raw.bot_token.trim().to_string(),
    })
}

/// Splits `raw` into usable credentials and excluded entries. Later duplicates of a session name are excluded.
pub fn validate_credentials(raw: &[RawCredential]) -> ValidatedCredentials {
    let mut result = ValidatedCredentials::default();
    let mut names = HashSet::new();

    for (index, entry) in raw.iter().enumerate() {
        let checked = check(entry).and_then(|cred| {
            if names.insert(cred.session_name.clone()) {
                Ok(cred)
            } else {
                Err(ExclusionReason::DuplicateSessionName)
            }
        });
        match checked {
            Ok(cred) => result.valid.push(cred),
            Err(reason) => {
                warn!(
                    index,
                    session = %entry.session_name,
                    reason = %reason,
                    "Skipping bot credential"
                );
                result.excluded.push(Excluded {
                    index,
                    session_name: entry.session_name.clone(),
                    reason,
                });
            }
        }
    }

    result
}

/// Reads the credentials file: a JSON array of [`RawCredential`].
pub fn load_credentials(path: &Path) -> Result<Vec<RawCredential>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        GatebotError::Config(format!("Cannot read bots file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        GatebotError::Config(format!("Malformed bots file {}: {}", path.display(), e))
    })
}
