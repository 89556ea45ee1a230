use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    pub fn is_group_like(&self) -> bool {
        matches!(self, ChatKind::Group | ChatKind::Supergroup)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatRef {
    pub id: i64,
    pub kind: ChatKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub handle: Option<String>,
    pub display_name: String,
}

impl User {
    /// Handle when set and non-empty, display name otherwise.
    pub fn effective_name(&self) -> &str {
        match self.handle.as_deref() {
            Some(handle) if !handle.is_empty() => handle,
            _ => &self.display_name,
        }
    }
}

/// One update from the chat platform, reduced to what the bot acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    MembershipChange {
        chat: ChatRef,
        new_members: Vec<User>,
    },
    Command {
        chat: ChatRef,
        message_id: i32,
        name: String,
    },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SendWelcome { chat_id: i64, text: String },
    FetchAndReply { chat_id: i64, message_id: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: i64,
    pub text: String,
    pub reply_to: Option<i32>,
    pub format: TextFormat,
}

impl OutboundMessage {
    pub fn plain(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_to: None,
            format: TextFormat::Plain,
        }
    }

    pub fn markdown_reply(chat_id: i64, reply_to: i32, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_to: Some(reply_to),
            format: TextFormat::Markdown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub tag_name: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
}

/// Latest release per project key; key order is the reply order.
pub type ReleaseQueryResult = BTreeMap<String, ReleaseInfo>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_name_prefers_handle() {
        let user = User {
            handle: Some("alice".into()),
            display_name: "Alice".into(),
        };
        assert_eq!(user.effective_name(), "alice");
    }

    #[test]
    fn effective_name_falls_back_on_empty_or_missing_handle() {
        let empty = User {
            handle: Some(String::new()),
            display_name: "Bob".into(),
        };
        assert_eq!(empty.effective_name(), "Bob");

        let missing = User {
            handle: None,
            display_name: "Carol".into(),
        };
        assert_eq!(missing.effective_name(), "Carol");
    }
}
