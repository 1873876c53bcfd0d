//! Errors surfaced by the bot helpers.

use thiserror::Error;

use crate::config::ConfigError;
use crate::slack::SlackApiError;

#[derive(Debug, Error)]
pub enum BotError {
    /// The caller passed something unusable. Never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Api(#[from] SlackApiError),

    #[error(
        "was not able to find any Slack users to respond to: \
         no email was parsed into a valid Slack account"
    )]
    NoUsersResolved,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
