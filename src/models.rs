// ABOUTME: Core data models for the Summit Coach API
// ABOUTME: Defines UserContext, DailyPrompt, conversation records and related enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

//! Core data models shared across the pipeline, database managers, and routes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How much explanation the user wants in coaching replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationStyle {
    /// Direct, minimal framing
    Concise,
    /// Default mix of brevity and context
    Balanced,
    /// Full explanations with examples
    Detailed,
}

impl CommunicationStyle {
    /// Database/string representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Concise => "concise",
            Self::Balanced => "balanced",
            Self::Detailed => "detailed",
        }
    }

    /// Parse a stored value, defaulting to balanced for anything unrecognized
    #[must_use]
    pub fn from_str_or_default(value: &str) -> Self {
        match value {
            "concise" => Self::Concise,
            "detailed" => Self::Detailed,
            _ => Self::Balanced,
        }
    }
}

/// Preferred reply length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseLength {
    /// A few sentences
    Short,
    /// Default
    Medium,
    /// Multiple paragraphs
    Long,
}

impl ResponseLength {
    /// Database/string representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }

    /// Parse a stored value, defaulting to medium for anything unrecognized
    #[must_use]
    pub fn from_str_or_default(value: &str) -> Self {
        match value {
            "short" => Self::Short,
            "long" => Self::Long,
            _ => Self::Medium,
        }
    }
}

/// Who authored a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    /// The coached user
    User,
    /// The coaching assistant
    Assistant,
}

impl MessageSender {
    /// Database/string representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Everything the prompt assembler needs to know about the user
///
/// Loaded from the joined user/profile rows; when the user is unknown or the
/// load fails, [`UserContext::default`] supplies the documented fallbacks so
/// the pipeline always has a usable context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    /// Display name used in the prompt ("Leader" when unknown)
    pub first_name: String,
    /// Business name used in the prompt ("Your Business" when unknown)
    pub business_name: String,
    /// 1-based day in the coaching journey
    pub current_day: u32,
    /// Reply style preference
    pub communication_style: CommunicationStyle,
    /// Reply length preference
    pub preferred_response_length: ResponseLength,
    /// Whether the user paused their journey
    pub journey_paused: bool,
    /// IANA timezone name
    pub timezone: String,
}

impl Default for UserContext {
    fn default() -> Self {
        Self {
            first_name: "Leader".into(),
            business_name: "Your Business".into(),
            current_day: 1,
            communication_style: CommunicationStyle::Balanced,
            preferred_response_length: ResponseLength::Medium,
            journey_paused: false,
            timezone: "America/New_York".into(),
        }
    }
}

/// A day's curriculum prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPrompt {
    /// 1-based journey day this prompt belongs to
    pub day_number: u32,
    /// Short title
    pub title: String,
    /// Prompt body presented to the user
    pub body: String,
    /// Fill-in-the-blank fragments, empty when the row has none
    #[serde(default)]
    pub fill_in_blanks: Vec<String>,
    /// Reflection questions offered alongside the prompt
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
    /// Content revision; the highest active version wins
    pub version: i64,
}

/// A stored conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Conversation id (uuid)
    pub id: String,
    /// Owning user id
    pub user_id: String,
    /// Display title
    pub title: String,
    /// Lifecycle status (`active` or `closed`)
    pub status: String,
    /// Total messages appended so far
    pub message_count: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last message append time
    pub last_message_at: DateTime<Utc>,
}

/// A stored conversation message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message id (uuid)
    pub id: String,
    /// Parent conversation id
    pub conversation_id: String,
    /// `user` or `assistant`
    pub sender: String,
    /// Message text
    pub content: String,
    /// Append time
    pub created_at: DateTime<Utc>,
}

/// Aggregate chat usage for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMetrics {
    /// Conversations owned by the user
    pub total_conversations: i64,
    /// Messages across all of the user's conversations
    pub total_messages: i64,
    /// Distinct days with recorded chat activity
    pub active_days: i64,
    /// Most recent message time, if any
    pub last_activity: Option<DateTime<Utc>>,
    /// Messages per conversation, 0 when there are no conversations
    pub average_messages_per_conversation: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_parse_defaults_to_balanced() {
        assert_eq!(
            CommunicationStyle::from_str_or_default("concise"),
            CommunicationStyle::Concise
        );
        assert_eq!(
            CommunicationStyle::from_str_or_default("whatever"),
            CommunicationStyle::Balanced
        );
    }

    #[test]
    fn test_user_context_defaults() {
        let ctx = UserContext::default();
        assert_eq!(ctx.first_name, "Leader");
        assert_eq!(ctx.business_name, "Your Business");
        assert_eq!(ctx.current_day, 1);
        assert_eq!(ctx.communication_style, CommunicationStyle::Balanced);
        assert_eq!(ctx.preferred_response_length, ResponseLength::Medium);
        assert!(!ctx.journey_paused);
        assert_eq!(ctx.timezone, "America/New_York");
    }
}
