//! Bot configuration and token lookup.
//!
//! Everything is read from environment variables. Unset or unparseable
//! tuning values fall back to defaults; a missing token is an error.

use std::time::Duration;

use thiserror::Error;

use crate::slack::{DEFAULT_API_BASE, RetryConfig};

/// Total attempts for posting a reply.
pub const NUM_RETRIES_VAR: &str = "ANSWER_BOT_NUM_RETRIES";

/// First backoff delay, in milliseconds.
pub const RETRY_INITIAL_DELAY_VAR: &str = "ANSWER_BOT_RETRY_INITIAL_DELAY_MS";

pub const API_BASE_VAR: &str = "ANSWER_BOT_SLACK_API_BASE";

pub const REQUEST_TIMEOUT_VAR: &str = "ANSWER_BOT_REQUEST_TIMEOUT_SECS";

pub const BOT_TOKEN_VAR: &str = "ANSWER_BOT_SLACK_BOT_TOKEN";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {0} is empty")]
    Empty(&'static str),
}

/// Runtime settings for the Slack helpers.
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    pub api_base: String,
    pub request_timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            retry: RetryConfig::DEFAULT,
        }
    }
}

impl BotConfig {
    /// Reads the `ANSWER_BOT_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parse_u64 = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        let max_attempts = lookup(NUM_RETRIES_VAR)
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.retry.max_attempts);
        let initial_delay = parse_u64(RETRY_INITIAL_DELAY_VAR)
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry.initial_delay);
        let request_timeout = parse_u64(REQUEST_TIMEOUT_VAR)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        let api_base = lookup(API_BASE_VAR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.api_base);

        BotConfig {
            api_base,
            request_timeout,
            retry: RetryConfig {
                max_attempts,
                initial_delay,
                ..defaults.retry
            },
        }
    }
}

/// Credentials the bot authenticates with.
#[derive(Clone, PartialEq, Eq)]
pub struct SlackTokens {
    pub bot_token: String,
}

impl std::fmt::Debug for SlackTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackTokens").finish_non_exhaustive()
    }
}

/// Where Slack tokens come from.
pub trait TokenSource {
    fn fetch_tokens(&self) -> Result<SlackTokens, ConfigError>;
}

/// Reads the bot token from `ANSWER_BOT_SLACK_BOT_TOKEN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvTokenSource;

impl TokenSource for EnvTokenSource {
    fn fetch_tokens(&self) -> Result<SlackTokens, ConfigError> {
        tokens_from_lookup(|key| std::env::var(key).ok())
    }
}

/// Fixed tokens, for callers that already hold them.
#[derive(Debug, Clone)]
pub struct StaticTokenSource(pub SlackTokens);

impl TokenSource for StaticTokenSource {
    fn fetch_tokens(&self) -> Result<SlackTokens, ConfigError> {
        Ok(self.0.clone())
    }
}

fn tokens_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<SlackTokens, ConfigError> {
    let raw = lookup(BOT_TOKEN_VAR).ok_or(ConfigError::Missing(BOT_TOKEN_VAR))?;
    let bot_token = raw.trim();
    if bot_token.is_empty() {
        return Err(ConfigError::Empty(BOT_TOKEN_VAR));
    }
    Ok(SlackTokens {
        bot_token: bot_token.to_string(),
    })
}
