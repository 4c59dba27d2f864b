//! Inbound and outbound activities.
//!
//! The dialog core only inspects the activity type, text, locale and
//! membership metadata of inbound activities. Outbound activities are
//! queued in an [`Outbox`] and handed back to the channel after the turn.

use serde::{Deserialize, Serialize};

/// Kind of inbound activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityType {
    Message,
    ConversationUpdate,
}

/// A participant added to (or present in) a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    pub name: String,
}

/// Inbound activity delivered by the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub members_added: Vec<ChannelAccount>,
}

impl Activity {
    /// Creates a plain message activity.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            activity_type: ActivityType::Message,
            text: Some(text.into()),
            locale: None,
            members_added: Vec::new(),
        }
    }

    /// Creates a conversation update announcing new members.
    pub fn members_added<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            activity_type: ActivityType::ConversationUpdate,
            text: None,
            locale: None,
            members_added: names
                .into_iter()
                .map(|name| ChannelAccount { name: name.into() })
                .collect(),
        }
    }

    /// Sets the locale of the activity.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Raw text, or an empty string when the activity carries none.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Text trimmed and lower-cased, used for keyword matching.
    pub fn normalized_text(&self) -> String {
        self.text_or_empty().trim().to_lowercase()
    }
}

/// Hint telling the channel whether the bot expects a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputHint {
    ExpectingInput,
    AcceptingInput,
    IgnoringInput,
}

/// Activity emitted by the bot during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundActivity {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_actions: Vec<String>,
    pub input_hint: InputHint,
}

impl OutboundActivity {
    /// A plain informational message.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            suggested_actions: Vec::new(),
            input_hint: InputHint::AcceptingInput,
        }
    }

    /// A question awaiting the user's answer.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            suggested_actions: Vec::new(),
            input_hint: InputHint::ExpectingInput,
        }
    }

    /// Attaches suggested actions (quick replies).
    pub fn with_suggested_actions(mut self, actions: Vec<String>) -> Self {
        self.suggested_actions = actions;
        self
    }
}

/// Activities produced during one turn, in send order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outbox {
    activities: Vec<OutboundActivity>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&mut self, activity: OutboundActivity) {
        self.activities.push(activity);
    }

    /// True once any activity has been queued this turn.
    pub fn responded(&self) -> bool {
        !self.activities.is_empty()
    }

    pub fn activities(&self) -> &[OutboundActivity] {
        &self.activities
    }

    pub fn into_activities(self) -> Vec<OutboundActivity> {
        self.activities
    }
}
