//! Normalized thread history handed to the answering pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sender display name used for replies the bot itself posted.
pub const ASSISTANT_SENDER: &str = "Assistant";

/// Who authored a message in a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// A human in the channel.
    User,
    /// This bot.
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One reply from a Slack thread, reduced to what the answer pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub message: String,

    /// Display name of the author, `None` when it could not be resolved.
    pub sender: Option<String>,

    pub role: MessageRole,
}

impl ThreadMessage {
    pub fn user(message: impl Into<String>, sender: Option<String>) -> Self {
        ThreadMessage {
            message: message.into(),
            sender,
            role: MessageRole::User,
        }
    }

    pub fn assistant(message: impl Into<String>) -> Self {
        ThreadMessage {
            message: message.into(),
            sender: Some(ASSISTANT_SENDER.to_string()),
            role: MessageRole::Assistant,
        }
    }
}
