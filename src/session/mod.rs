use crate::model::USER_MODEL_ID;
use chrono::{DateTime, Utc};

pub mod ids;
pub mod store;

pub const DEFAULT_TITLE: &str = "New Chat";
pub const TITLE_PREFIX_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
    pub model_id: String,
}

impl Message {
    pub fn user(id: impl Into<String>, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            role: Role::User,
            timestamp,
            model_id: USER_MODEL_ID.to_string(),
        }
    }

    pub fn assistant(
        id: impl Into<String>,
        model_id: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            role: Role::Assistant,
            timestamp,
            model_id: model_id.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Text handed to the clipboard.
    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<Message>,
    /// Models the next dispatch of a "new chat with..." session goes to.
    /// Cleared after that dispatch; `None` follows the registry's active flags.
    pub model_scope: Option<Vec<String>>,
}

impl Session {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            created_at,
            messages: Vec::new(),
            model_scope: None,
        }
    }

    pub fn message(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == message_id)
    }

    /// Shared user turns interleaved with the replies of one model.
    pub fn messages_for_model<'a>(&'a self, model_id: &'a str) -> impl Iterator<Item = &'a Message> {
        self.messages
            .iter()
            .filter(move |message| message.is_user() || message.model_id == model_id)
    }
}

pub fn title_from_content(content: &str) -> String {
    let prefix: String = content.chars().take(TITLE_PREFIX_CHARS).collect();
    format!("{prefix}...")
}
