//! Shared test utilities: a scripted [`SlackApi`] and reply builders.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::slack::{
    AuthIdentity, Block, ChannelInfo, OutgoingMessage, PostedMessage, RepliesPage, SlackApi,
    SlackApiError, SlackUser, ThreadReply, UserProfile,
};
use crate::types::{ChannelId, MessageTs, UserId};

/// The bot user id the stub reports from `auth.test`.
pub const STUB_BOT_USER: &str = "UBOT";

/// In-memory Slack. Lookups miss with the error Slack would send; posts
/// succeed unless a scripted result is queued.
#[derive(Debug)]
pub struct StubSlackApi {
    bot_user: UserId,
    auth_failures: Mutex<u32>,
    auth_delay: Option<Duration>,
    post_results: Mutex<VecDeque<Result<PostedMessage, SlackApiError>>>,
    posted: Mutex<Vec<OutgoingMessage>>,
    ephemeral: Mutex<Vec<OutgoingMessage>>,
    users: HashMap<UserId, SlackUser>,
    emails: HashMap<String, SlackUser>,
    channels: HashMap<ChannelId, ChannelInfo>,
    reply_pages: Vec<Vec<ThreadReply>>,
    last_page_cursor: Option<String>,
    replies_error: Mutex<Option<SlackApiError>>,
    calls: Mutex<HashMap<&'static str, u32>>,
}

impl Default for StubSlackApi {
    fn default() -> Self {
        Self::new()
    }
}

impl StubSlackApi {
    pub fn new() -> Self {
        Self {
            bot_user: UserId::new(STUB_BOT_USER),
            auth_failures: Mutex::new(0),
            auth_delay: None,
            post_results: Mutex::new(VecDeque::new()),
            posted: Mutex::new(Vec::new()),
            ephemeral: Mutex::new(Vec::new()),
            users: HashMap::new(),
            emails: HashMap::new(),
            channels: HashMap::new(),
            reply_pages: Vec::new(),
            last_page_cursor: None,
            replies_error: Mutex::new(None),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// The first `n` `auth.test` calls fail with a transient error.
    pub fn with_auth_failures(self, n: u32) -> Self {
        *self.auth_failures.lock().unwrap() = n;
        self
    }

    /// Every `auth.test` call takes `delay` before answering.
    pub fn with_auth_delay(mut self, delay: Duration) -> Self {
        self.auth_delay = Some(delay);
        self
    }

    /// Results for successive post calls (regular and ephemeral share the queue).
    pub fn with_post_results(self, results: Vec<Result<PostedMessage, SlackApiError>>) -> Self {
        self.post_results.lock().unwrap().extend(results);
        self
    }

    pub fn with_user(mut self, user: SlackUser) -> Self {
        self.users.insert(user.id.clone(), user);
        self
    }

    pub fn with_email(mut self, email: &str, user: SlackUser) -> Self {
        self.emails.insert(email.to_string(), user);
        self
    }

    pub fn with_channel(mut self, channel: ChannelInfo) -> Self {
        self.channels.insert(channel.id.clone(), channel);
        self
    }

    /// A single-page thread.
    pub fn with_thread(self, replies: Vec<ThreadReply>) -> Self {
        self.with_reply_pages(vec![replies])
    }

    /// A thread split across pages; page `n` is served for cursor `"n"`.
    pub fn with_reply_pages(mut self, pages: Vec<Vec<ThreadReply>>) -> Self {
        self.reply_pages = pages;
        self
    }

    /// The last page points at `cursor` instead of ending the thread.
    pub fn with_last_page_cursor(mut self, cursor: &str) -> Self {
        self.last_page_cursor = Some(cursor.to_string());
        self
    }

    /// The next `conversations.replies` call fails with `err`.
    pub fn with_replies_error(self, err: SlackApiError) -> Self {
        *self.replies_error.lock().unwrap() = Some(err);
        self
    }

    /// How many times `method` was called.
    pub fn calls(&self, method: &str) -> u32 {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn posted(&self) -> Vec<OutgoingMessage> {
        self.posted.lock().unwrap().clone()
    }

    pub fn ephemeral(&self) -> Vec<OutgoingMessage> {
        self.ephemeral.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str) {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
    }

    fn next_post_result(&self) -> Result<PostedMessage, SlackApiError> {
        self.post_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(PostedMessage::default()))
    }
}

impl SlackApi for StubSlackApi {
    async fn post_message(
        &self,
        message: &OutgoingMessage,
    ) -> Result<PostedMessage, SlackApiError> {
        self.record("chat.postMessage");
        self.posted.lock().unwrap().push(message.clone());
        self.next_post_result()
    }

    async fn post_ephemeral(
        &self,
        message: &OutgoingMessage,
    ) -> Result<PostedMessage, SlackApiError> {
        self.record("chat.postEphemeral");
        self.ephemeral.lock().unwrap().push(message.clone());
        self.next_post_result()
    }

    async fn auth_test(&self) -> Result<AuthIdentity, SlackApiError> {
        self.record("auth.test");
        if let Some(delay) = self.auth_delay {
            tokio::time::sleep(delay).await;
        }
        let mut failures = self.auth_failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(SlackApiError::transient_without_source(
                "auth.test",
                "scripted failure",
            ));
        }
        Ok(AuthIdentity {
            user_id: self.bot_user.clone(),
            bot_id: Some("BSTUB".to_string()),
            team_id: Some("TSTUB".to_string()),
        })
    }

    async fn conversations_info(&self, channel: &ChannelId) -> Result<ChannelInfo, SlackApiError> {
        self.record("conversations.info");
        self.channels.get(channel).cloned().ok_or_else(|| {
            SlackApiError::from_slack_error("conversations.info", "channel_not_found", None)
        })
    }

    async fn users_lookup_by_email(&self, email: &str) -> Result<SlackUser, SlackApiError> {
        self.record("users.lookupByEmail");
        self.emails.get(email).cloned().ok_or_else(|| {
            SlackApiError::from_slack_error("users.lookupByEmail", "users_not_found", None)
        })
    }

    async fn users_info(&self, user: &UserId) -> Result<SlackUser, SlackApiError> {
        self.record("users.info");
        self.users
            .get(user)
            .cloned()
            .ok_or_else(|| SlackApiError::from_slack_error("users.info", "user_not_found", None))
    }

    async fn conversations_replies(
        &self,
        _channel: &ChannelId,
        _thread_ts: &MessageTs,
        cursor: Option<&str>,
    ) -> Result<RepliesPage, SlackApiError> {
        self.record("conversations.replies");
        if let Some(err) = self.replies_error.lock().unwrap().take() {
            return Err(err);
        }
        let index = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
        let messages = self.reply_pages.get(index).cloned().unwrap_or_default();
        let next_cursor = if index + 1 < self.reply_pages.len() {
            Some((index + 1).to_string())
        } else {
            self.last_page_cursor.clone()
        };
        Ok(RepliesPage {
            messages,
            next_cursor,
        })
    }
}

// ─── Builders ─────────────────────────────────────────────────────────────────

pub fn slack_user(
    id: &str,
    real_name: Option<&str>,
    name: Option<&str>,
    email: Option<&str>,
) -> SlackUser {
    SlackUser {
        id: UserId::new(id),
        name: name.map(str::to_string),
        real_name: real_name.map(str::to_string),
        profile: UserProfile {
            email: email.map(str::to_string),
            display_name: None,
        },
    }
}

pub fn human_reply(user: &str, text: &str) -> ThreadReply {
    ThreadReply {
        ts: Some(MessageTs::new("1700000001.000100")),
        user: Some(UserId::new(user)),
        bot_id: None,
        text: Some(text.to_string()),
        blocks: Vec::new(),
    }
}

pub fn bot_reply(user: &str, bot_id: &str, blocks: Vec<Block>) -> ThreadReply {
    ThreadReply {
        ts: Some(MessageTs::new("1700000002.000100")),
        user: Some(UserId::new(user)),
        bot_id: Some(bot_id.to_string()),
        text: None,
        blocks,
    }
}
