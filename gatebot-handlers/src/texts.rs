//! User-facing text templates, loaded from the locale file.

use serde::Deserialize;

/// Translation data. All fields except `reply_prefix` are required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Texts {
    /// Greeting for `/start`; `{first_name}` is replaced by the sender's name.
    pub start_text: String,
    /// Prompt sent to a user who has not joined the required channel.
    pub gate_prompt: String,
    /// Label of the join button under the prompt.
    pub gate_button: String,
    /// Prepended to echoed text when set.
    #[serde(default)]
    pub reply_prefix: Option<String>,
}

impl Texts {
    pub fn start_for(&self, first_name: &str) -> String {
        self.start_text.replace("{first_name}", first_name)
    }

    pub fn reply_for(&self, text: &str) -> String {
        match self.reply_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{}{}", prefix, text),
            _ => text.to_string(),
        }
    }
}

impl Default for Texts {
    fn default() -> Self {
        Self {
            start_text: "Bot is alive, {first_name}!\n\nComing soon...".to_string(),
            gate_prompt: "Please join our channel to use this bot, then send your message again."
                .to_string(),
            gate_button: "Join channel".to_string(),
            reply_prefix: None,
        }
    }
}
