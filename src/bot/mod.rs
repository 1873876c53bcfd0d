//! Bot-level helpers on top of the Slack API.
//!
//! [`BotClient`] wraps any [`SlackApi`] implementation together with the
//! retry settings for posting and a cache of the bot's own user id.

mod channel;
mod error;
pub mod logging;
mod respond;
mod thread;
mod users;

use tokio::sync::OnceCell;

pub use error::BotError;
pub use logging::{ChannelLogger, init_tracing};
pub use respond::PostRequest;
pub use thread::FILTERS_DISCLAIMER_PREFIX;

use crate::config::{BotConfig, TokenSource};
use crate::slack::{RetryConfig, RetryPolicy, SlackApi, SlackApiError, SlackClient};
use crate::types::UserId;

/// A Slack API handle plus per-bot state.
pub struct BotClient<A> {
    api: A,
    retry: RetryConfig,
    retry_policy: RetryPolicy,

    /// The bot's user id from `auth.test`, resolved on first use.
    identity: OnceCell<UserId>,
}

impl BotClient<SlackClient> {
    /// Builds an HTTP-backed client from configuration and a token source.
    pub fn connect(config: &BotConfig, tokens: &impl TokenSource) -> Result<Self, BotError> {
        let tokens = tokens.fetch_tokens()?;
        let api = SlackClient::from_config(config, &tokens)?;
        Ok(Self::new(api).with_retry(config.retry, RetryPolicy::default()))
    }
}

impl<A: SlackApi> BotClient<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            retry: RetryConfig::DEFAULT,
            retry_policy: RetryPolicy::default(),
            identity: OnceCell::new(),
        }
    }

    /// Replaces the retry settings used when posting.
    pub fn with_retry(mut self, config: RetryConfig, policy: RetryPolicy) -> Self {
        self.retry = config;
        self.retry_policy = policy;
        self
    }

    /// Seeds the identity cache, skipping the `auth.test` call.
    pub fn with_bot_user_id(self, user_id: UserId) -> Self {
        Self {
            identity: OnceCell::new_with(Some(user_id)),
            ..self
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry
    }

    /// The bot's own user id. `auth.test` is called at most once per
    /// client, even under concurrent first use; a failed lookup is not
    /// cached.
    pub async fn bot_user_id(&self) -> Result<&UserId, SlackApiError> {
        self.identity
            .get_or_try_init(|| async {
                let identity = self.api.auth_test().await?;
                tracing::debug!(user_id = %identity.user_id, "Resolved bot identity");
                Ok::<_, SlackApiError>(identity.user_id)
            })
            .await
    }

    /// Removes mentions of the bot (`<@BOT>` plus one whitespace character).
    pub async fn remove_bot_tag(&self, text: &str) -> Result<String, SlackApiError> {
        let bot = self.bot_user_id().await?;
        Ok(strip_mention(text, bot))
    }
}

impl<A> std::fmt::Debug for BotClient<A>
where
    A: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotClient")
            .field("api", &self.api)
            .field("retry", &self.retry)
            .field("retry_policy", &self.retry_policy)
            .field("identity", &self.identity.get())
            .finish()
    }
}

/// Drops every `<@user>` that is followed by a whitespace character,
/// together with that character.
pub fn strip_mention(text: &str, user: &UserId) -> String {
    let mention = user.mention();
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find(&mention) {
        let after = &rest[idx + mention.len()..];
        match after.chars().next() {
            Some(c) if c.is_whitespace() => {
                out.push_str(&rest[..idx]);
                rest = &after[c.len_utf8()..];
            }
            _ => {
                out.push_str(&rest[..idx + mention.len()]);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
