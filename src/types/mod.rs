//! Core domain types shared by the Slack helpers.

pub mod ids;
pub mod thread;

pub use ids::{ChannelId, MessageTs, UserId};
pub use thread::{ASSISTANT_SENDER, MessageRole, ThreadMessage};
