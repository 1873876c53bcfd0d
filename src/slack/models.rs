//! Request and response shapes for the Slack Web API methods the bot uses.
//!
//! Only the fields the bot reads are modelled. Unknown fields are ignored so
//! that Slack adding attributes never breaks deserialization.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::types::{ChannelId, MessageTs, UserId};

/// A Block Kit block, kept as raw JSON.
///
/// The bot builds blocks elsewhere and only needs to read the `text.text` of
/// section blocks back out of thread history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block(pub Value);

impl Block {
    pub fn header(text: &str) -> Self {
        Block(json!({
            "type": "header",
            "text": { "type": "plain_text", "text": text },
        }))
    }

    pub fn section(markdown: &str) -> Self {
        Block(json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": markdown },
        }))
    }

    /// The block's `text.text`, if it has one.
    pub fn text(&self) -> Option<&str> {
        self.0.get("text")?.get("text")?.as_str()
    }
}

/// Structured metadata attached to a posted message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub event_type: String,
    pub event_payload: Value,
}

/// Body for `chat.postMessage` and `chat.postEphemeral`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub channel: ChannelId,

    /// Set only for `chat.postEphemeral`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<MessageTs>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Block>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,

    pub unfurl_links: bool,
    pub unfurl_media: bool,
}

/// What Slack hands back after a successful post.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PostedMessage {
    #[serde(default)]
    pub channel: Option<ChannelId>,

    /// `ts` for regular posts, `message_ts` for ephemeral ones.
    #[serde(default, alias = "message_ts")]
    pub ts: Option<MessageTs>,
}

/// Identity of the token's owner, from `auth.test`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthIdentity {
    /// The bot's user id; replies the bot posts carry it in `user`.
    pub user_id: UserId,

    #[serde(default)]
    pub bot_id: Option<String>,

    #[serde(default)]
    pub team_id: Option<String>,
}

/// The subset of a conversation object the bot cares about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelInfo {
    pub id: ChannelId,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub is_im: bool,

    #[serde(default)]
    pub is_mpim: bool,

    #[serde(default)]
    pub is_private: bool,
}

impl ChannelInfo {
    /// Direct message, one-to-one or group.
    pub fn is_dm(&self) -> bool {
        self.is_im || self.is_mpim
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlackUser {
    pub id: UserId,

    /// The handle.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub real_name: Option<String>,

    #[serde(default)]
    pub profile: UserProfile,
}

impl SlackUser {
    /// Best human-readable name: real name, then handle, then email.
    /// Empty values are skipped.
    pub fn semantic_id(&self) -> Option<&str> {
        [
            self.real_name.as_deref(),
            self.name.as_deref(),
            self.profile.email.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
    }
}

/// One message from `conversations.replies`. The root message is included.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ThreadReply {
    #[serde(default)]
    pub ts: Option<MessageTs>,

    #[serde(default)]
    pub user: Option<UserId>,

    /// Present on anything posted by an app integration.
    #[serde(default)]
    pub bot_id: Option<String>,

    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl ThreadReply {
    /// Written by a person rather than an integration.
    pub fn is_from_human(&self) -> bool {
        self.user.is_some() && self.bot_id.is_none()
    }
}

/// One page of `conversations.replies`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepliesPage {
    pub messages: Vec<ThreadReply>,

    /// Cursor for the next page; `None` on the last page.
    pub next_cursor: Option<String>,
}
