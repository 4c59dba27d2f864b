//! Bot behavior configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Bot behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Name the bot joins conversations under; never greeted
    #[serde(default = "default_bot_name")]
    pub bot_name: String,

    /// Locale used for recognition when an activity carries none
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Word that cancels the active flow (matched trimmed, case-insensitive)
    #[serde(default = "default_cancel_keyword")]
    pub cancel_keyword: String,

    /// Begin the flow right after greeting a new member
    #[serde(default)]
    pub auto_begin_on_join: bool,

    /// Greeting sent when a member joins
    #[serde(default = "default_description")]
    pub description: String,

    /// Dialog begun when no flow is active
    #[serde(default = "default_root_dialog")]
    pub root_dialog: String,

    /// YAML flow definition; the built-in profile flow when unset
    pub schema_path: Option<PathBuf>,
}

impl BotConfig {
    /// Validate bot configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bot_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("BOT__BOT_NAME"));
        }
        if self.default_locale.trim().is_empty() {
            return Err(ValidationError::MissingRequired("BOT__DEFAULT_LOCALE"));
        }
        let keyword = self.cancel_keyword.trim();
        if keyword.is_empty() || keyword.contains(char::is_whitespace) {
            return Err(ValidationError::InvalidCancelKeyword);
        }
        if self.root_dialog.trim().is_empty() {
            return Err(ValidationError::InvalidRootDialog);
        }
        Ok(())
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_name: default_bot_name(),
            default_locale: default_locale(),
            cancel_keyword: default_cancel_keyword(),
            auto_begin_on_join: false,
            description: default_description(),
            root_dialog: default_root_dialog(),
            schema_path: None,
        }
    }
}

fn default_bot_name() -> String {
    "Bot".to_string()
}

fn default_locale() -> String {
    "en-us".to_string()
}

fn default_cancel_keyword() -> String {
    "cancel".to_string()
}

fn default_description() -> String {
    "This is a bot that demonstrates an alternate dialog system which uses a slot filling \
     technique to collect multiple responses from a user. Say anything to continue."
        .to_string()
}

fn default_root_dialog() -> String {
    "root".to_string()
}
