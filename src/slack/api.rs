//! The Slack Web API surface the bot depends on.
//!
//! [`SlackClient`](super::SlackClient) implements it over HTTP. Tests
//! implement it with scripted responses, so the helpers built on top can be
//! exercised without a workspace.
//!
//! # Example (stub for testing)
//!
//! ```ignore
//! struct AlwaysRateLimited;
//!
//! impl SlackApi for AlwaysRateLimited {
//!     async fn post_message(&self, _: &OutgoingMessage) -> Result<PostedMessage, SlackApiError> {
//!         Err(SlackApiError::from_slack_error("chat.postMessage", "ratelimited", None))
//!     }
//!     // ...
//! }
//! ```

use std::future::Future;

use super::error::SlackApiError;
use super::models::{
    AuthIdentity, ChannelInfo, OutgoingMessage, PostedMessage, RepliesPage, SlackUser,
};
use crate::types::{ChannelId, MessageTs, UserId};

/// One method per Slack Web API call. Each call is a single attempt; retry
/// is layered on by the caller.
pub trait SlackApi {
    /// `chat.postMessage`
    fn post_message(
        &self,
        message: &OutgoingMessage,
    ) -> impl Future<Output = Result<PostedMessage, SlackApiError>> + Send;

    /// `chat.postEphemeral`; `message.user` names the recipient.
    fn post_ephemeral(
        &self,
        message: &OutgoingMessage,
    ) -> impl Future<Output = Result<PostedMessage, SlackApiError>> + Send;

    /// `auth.test`
    fn auth_test(&self) -> impl Future<Output = Result<AuthIdentity, SlackApiError>> + Send;

    /// `conversations.info`
    fn conversations_info(
        &self,
        channel: &ChannelId,
    ) -> impl Future<Output = Result<ChannelInfo, SlackApiError>> + Send;

    /// `users.lookupByEmail`
    fn users_lookup_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<SlackUser, SlackApiError>> + Send;

    /// `users.info`
    fn users_info(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<SlackUser, SlackApiError>> + Send;

    /// `conversations.replies`, one page.
    fn conversations_replies(
        &self,
        channel: &ChannelId,
        thread_ts: &MessageTs,
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<RepliesPage, SlackApiError>> + Send;
}
