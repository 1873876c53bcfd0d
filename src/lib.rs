//! Slack helpers for an answer bot.
//!
//! This library provides the pieces the bot uses when talking to Slack:
//! posting replies with retry, encoding feedback block ids, formatting
//! highlighted search snippets, and reading threads back as conversation
//! history.

pub mod bot;
pub mod config;
pub mod feedback;
pub mod slack;
pub mod text;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use bot::{BotClient, BotError, PostRequest};
pub use config::{BotConfig, EnvTokenSource, TokenSource};
pub use feedback::{FeedbackId, FeedbackIdError, build_feedback_block_id, decompose_block_id};
pub use slack::{SlackApi, SlackApiError, SlackClient};
pub use text::{remove_slack_text_interactions, translate_highlight_to_slack};
pub use types::{MessageRole, ThreadMessage};
