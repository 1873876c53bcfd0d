//! HTTP client for the Slack Web API.
//!
//! `SlackClient` authenticates every call with the bot token and turns
//! Slack's two failure channels (HTTP status and `ok: false`) into
//! [`SlackApiError`]. It never retries on its own.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::api::SlackApi;
use super::error::SlackApiError;
use super::models::{
    AuthIdentity, ChannelInfo, OutgoingMessage, PostedMessage, RepliesPage, SlackUser,
    ThreadReply,
};
use crate::config::{BotConfig, SlackTokens};
use crate::types::{ChannelId, MessageTs, UserId};

/// Public Slack Web API endpoint.
pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// Page size requested from `conversations.replies`.
const REPLIES_PAGE_LIMIT: &str = "200";

/// A Slack Web API client authenticated as the bot.
#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,

    /// Base URL without trailing slash; methods are appended as `/<method>`.
    api_base: String,

    bot_token: String,
}

impl SlackClient {
    pub fn new(
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, SlackApiError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("slack-answer-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SlackApiError::from_reqwest("client.build", e))?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into().trim().to_string(),
        })
    }

    /// Client against the public API with default settings.
    pub fn from_token(bot_token: impl Into<String>) -> Result<Self, SlackApiError> {
        let defaults = BotConfig::default();
        Self::new(DEFAULT_API_BASE, bot_token, defaults.request_timeout)
    }

    pub fn from_config(config: &BotConfig, tokens: &SlackTokens) -> Result<Self, SlackApiError> {
        Self::new(&config.api_base, &tokens.bot_token, config.request_timeout)
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    async fn post_json<B, T>(&self, method: &'static str, body: &B) -> Result<T, SlackApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.url(method)).json(body);
        self.send(method, request).await
    }

    async fn get_query<T>(
        &self,
        method: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T, SlackApiError>
    where
        T: DeserializeOwned,
    {
        let request = self.http.get(self.url(method)).query(query);
        self.send(method, request).await
    }

    async fn send<T>(
        &self,
        method: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SlackApiError>
    where
        T: DeserializeOwned,
    {
        let response = request
            .bearer_auth(&self.bot_token)
            .send()
            .await
            .map_err(|e| SlackApiError::from_reqwest(method, e))?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SlackApiError::from_http_status(
                method,
                status.as_u16(),
                &body,
                retry_after,
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SlackApiError::from_reqwest(method, e))?;
        if !body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            let code = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error");
            return Err(SlackApiError::from_slack_error(method, code, retry_after));
        }
        if let Some(warning) = body.get("warning").and_then(Value::as_str) {
            tracing::debug!(method, warning, "Slack returned a warning");
        }

        serde_json::from_value(body).map_err(|e| SlackApiError::malformed_response(method, e))
    }
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

// ─── Response envelopes ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChannelEnvelope {
    channel: ChannelInfo,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: SlackUser,
}

#[derive(Debug, Deserialize)]
struct RepliesEnvelope {
    #[serde(default)]
    messages: Vec<ThreadReply>,

    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: Option<String>,
}

impl From<RepliesEnvelope> for RepliesPage {
    fn from(envelope: RepliesEnvelope) -> Self {
        // Slack signals the last page with an empty cursor.
        let next_cursor = envelope
            .response_metadata
            .and_then(|m| m.next_cursor)
            .filter(|c| !c.is_empty());
        RepliesPage {
            messages: envelope.messages,
            next_cursor,
        }
    }
}

// ─── SlackApi ─────────────────────────────────────────────────────────────────

impl SlackApi for SlackClient {
    async fn post_message(
        &self,
        message: &OutgoingMessage,
    ) -> Result<PostedMessage, SlackApiError> {
        self.post_json("chat.postMessage", message).await
    }

    async fn post_ephemeral(
        &self,
        message: &OutgoingMessage,
    ) -> Result<PostedMessage, SlackApiError> {
        self.post_json("chat.postEphemeral", message).await
    }

    async fn auth_test(&self) -> Result<AuthIdentity, SlackApiError> {
        self.post_json("auth.test", &serde_json::json!({})).await
    }

    async fn conversations_info(&self, channel: &ChannelId) -> Result<ChannelInfo, SlackApiError> {
        let envelope: ChannelEnvelope = self
            .get_query("conversations.info", &[("channel", channel.as_str())])
            .await?;
        Ok(envelope.channel)
    }

    async fn users_lookup_by_email(&self, email: &str) -> Result<SlackUser, SlackApiError> {
        let envelope: UserEnvelope = self
            .get_query("users.lookupByEmail", &[("email", email)])
            .await?;
        Ok(envelope.user)
    }

    async fn users_info(&self, user: &UserId) -> Result<SlackUser, SlackApiError> {
        let envelope: UserEnvelope = self
            .get_query("users.info", &[("user", user.as_str())])
            .await?;
        Ok(envelope.user)
    }

    async fn conversations_replies(
        &self,
        channel: &ChannelId,
        thread_ts: &MessageTs,
        cursor: Option<&str>,
    ) -> Result<RepliesPage, SlackApiError> {
        let mut query = vec![
            ("channel", channel.as_str()),
            ("ts", thread_ts.as_str()),
            ("limit", REPLIES_PAGE_LIMIT),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }
        let envelope: RepliesEnvelope = self.get_query("conversations.replies", &query).await?;
        Ok(envelope.into())
    }
}

/// Seconds from a `Retry-After` header.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
