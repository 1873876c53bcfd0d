//! Slack Web API client, error taxonomy and retry.
//!
//! Key features:
//! - [`SlackApi`] trait as the seam between helpers and transport
//! - Distinguishes transient vs permanent failures
//! - Exponential backoff retry that honours `Retry-After`

mod api;
mod client;
mod error;
pub mod models;
mod retry;

pub use api::SlackApi;
pub use client::{DEFAULT_API_BASE, SlackClient};
pub use error::{SlackApiError, SlackErrorKind};
pub use models::{
    AuthIdentity, Block, ChannelInfo, MessageMetadata, OutgoingMessage, PostedMessage,
    RepliesPage, SlackUser, ThreadReply, UserProfile,
};
pub use retry::{RetryConfig, RetryPolicy, RetryResult, retry_with_backoff};
