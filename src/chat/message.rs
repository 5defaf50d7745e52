//! Chat messages as shown in the thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::types::{NewStoredMessage, StoredMessage, TurnMessage};
use crate::chat::content::MessageContent;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A message in a [`Thread`](crate::chat::Thread).
///
/// Immutable once rendered except for `actions_disabled`, which flips when a
/// later action supersedes the message's cards.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub rich_content: Vec<MessageContent>,
    pub timestamp: DateTime<Utc>,
    pub actions_disabled: bool,
}

impl ChatMessage {
    fn new(role: Role, content: String, rich_content: Vec<MessageContent>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            rich_content,
            timestamp: Utc::now(),
            actions_disabled: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), Vec::new())
    }

    pub fn assistant(content: impl Into<String>, rich_content: Vec<MessageContent>) -> Self {
        Self::new(Role::Assistant, content.into(), rich_content)
    }

    #[must_use]
    pub fn has_rich_content(&self) -> bool {
        !self.rich_content.is_empty()
    }

    /// Body for persisting this message.
    #[must_use]
    pub fn to_stored(&self) -> NewStoredMessage {
        NewStoredMessage {
            role: self.role,
            content: self.content.clone(),
            rich_content: self.rich_content.clone(),
        }
    }

    /// History entry for `POST /api/chat`.
    #[must_use]
    pub fn to_turn(&self) -> TurnMessage {
        TurnMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

impl From<StoredMessage> for ChatMessage {
    fn from(stored: StoredMessage) -> Self {
        Self {
            id: stored.id,
            role: stored.role,
            content: stored.content,
            rich_content: stored.rich_content,
            timestamp: stored.created_at,
            actions_disabled: false,
        }
    }
}
