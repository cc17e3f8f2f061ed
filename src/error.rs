use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditRejection {
    MessageMissing,
    NotUserMessage,
}

impl fmt::Display for EditRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MessageMissing => write!(f, "message not found"),
            Self::NotUserMessage => write!(f, "only user messages can be edited"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("session '{0}' not found")]
    SessionNotFound(String),

    #[error("model '{0}' not found")]
    ModelNotFound(String),

    #[error("message content is empty")]
    EmptyContent,

    #[error("a new chat needs at least one model")]
    EmptyModelScope,

    #[error("cannot edit message '{message_id}': {reason}")]
    InvalidEdit {
        message_id: String,
        reason: EditRejection,
    },
}

impl ChatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SessionNotFound(_) | Self::ModelNotFound(_) => ErrorKind::NotFound,
            Self::EmptyContent | Self::EmptyModelScope => ErrorKind::InvalidArgument,
            Self::InvalidEdit { reason, .. } => match reason {
                EditRejection::MessageMissing => ErrorKind::NotFound,
                EditRejection::NotUserMessage => ErrorKind::InvalidArgument,
            },
        }
    }
}
