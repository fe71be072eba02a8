//! Group protection settings and the banned-word list.

use serde::{Deserialize, Serialize};

use super::de;
use crate::error::{DomainError, DomainResult};

/// Per-session moderation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionOptions {
    /// Remove offenders from the group.
    #[serde(default)]
    pub auto_kick: bool,
    /// Delete offending messages.
    #[serde(default = "enabled")]
    pub auto_delete: bool,
    /// Group owners are never moderated.
    #[serde(default = "enabled")]
    pub allow_owner_bypass: bool,
}

const fn enabled() -> bool {
    true
}

impl Default for ProtectionOptions {
    fn default() -> Self {
        Self {
            auto_kick: false,
            auto_delete: true,
            allow_owner_bypass: true,
        }
    }
}

/// `GET/PUT /wa/session/settings` payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionSettings {
    /// Master switch.
    #[serde(default)]
    pub protection_enabled: bool,
    /// Individual switches.
    #[serde(default)]
    pub protection_settings: ProtectionOptions,
}

/// How a banned word is matched against message text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Anywhere in the message.
    #[default]
    Contains,
    /// Whole message.
    Exact,
    /// Message prefix.
    Starts,
    /// Message suffix.
    Ends,
}

/// How serious a banned word is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Low.
    Low,
    /// Medium.
    #[default]
    Medium,
    /// High.
    High,
}

/// What the bot does when a banned word matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordAction {
    /// Delete the message.
    Delete,
    /// Remove the sender.
    #[default]
    Kick,
    /// Warn the sender.
    Warn,
    /// Mute the sender.
    Mute,
}

macro_rules! parse_lowercase {
    ($ty:ty, $field:literal, { $($text:literal => $variant:expr),+ $(,)? }) => {
        impl std::str::FromStr for $ty {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($variant),)+
                    other => Err(DomainError::InvalidValue {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

parse_lowercase!(MatchType, "type", {
    "contains" => MatchType::Contains,
    "exact" => MatchType::Exact,
    "starts" => MatchType::Starts,
    "ends" => MatchType::Ends,
});

parse_lowercase!(Severity, "severity", {
    "low" => Severity::Low,
    "medium" => Severity::Medium,
    "high" => Severity::High,
});

parse_lowercase!(WordAction, "action", {
    "delete" => WordAction::Delete,
    "kick" => WordAction::Kick,
    "warn" => WordAction::Warn,
    "mute" => WordAction::Mute,
});

/// An entry of the user's banned-word list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannedWord {
    /// Identifier.
    #[serde(alias = "_id", deserialize_with = "de::id_string")]
    pub id: String,
    /// The word or phrase.
    pub word: String,
    /// Matching rule.
    #[serde(default, rename = "type")]
    pub match_type: MatchType,
    /// Severity.
    #[serde(default)]
    pub severity: Severity,
    /// Action on match.
    #[serde(default)]
    pub action: WordAction,
    /// Disabled words stay listed but never match.
    #[serde(default = "enabled")]
    pub is_active: bool,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// `POST /user/banned-words` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBannedWord {
    /// The word or phrase.
    pub word: String,
    /// Matching rule.
    #[serde(rename = "type")]
    pub match_type: MatchType,
    /// Severity.
    pub severity: Severity,
    /// Action on match.
    pub action: WordAction,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewBannedWord {
    /// A word with the default rule: contains, medium, kick.
    #[must_use]
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            match_type: MatchType::default(),
            severity: Severity::default(),
            action: WordAction::default(),
            notes: None,
        }
    }

    /// Trims the word and rejects blanks.
    ///
    /// # Errors
    ///
    /// Returns `MissingField("word")` when the word is blank.
    pub fn validated(mut self) -> DomainResult<Self> {
        let trimmed = self.word.trim();
        if trimmed.is_empty() {
            return Err(DomainError::MissingField("word"));
        }
        self.word = trimmed.to_string();
        self.notes = self.notes.filter(|n| !n.trim().is_empty());
        Ok(self)
    }
}
