//! Posting replies into a channel or thread.

use super::{BotClient, BotError, ChannelLogger};
use crate::slack::{
    Block, MessageMetadata, OutgoingMessage, SlackApi, SlackApiError, retry_with_backoff,
};
use crate::types::{ChannelId, MessageTs, UserId};

/// A reply to post.
///
/// With no receivers the reply is a regular message visible to the channel.
/// With receivers, each one gets an ephemeral copy only they can see.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRequest {
    pub channel: ChannelId,
    pub thread_ts: Option<MessageTs>,
    pub text: Option<String>,
    pub blocks: Option<Vec<Block>>,
    pub receiver_ids: Vec<UserId>,
    pub metadata: Option<MessageMetadata>,

    /// Let Slack expand link and media previews.
    pub unfurl: bool,
}

impl PostRequest {
    pub fn new(channel: impl Into<ChannelId>) -> Self {
        Self {
            channel: channel.into(),
            thread_ts: None,
            text: None,
            blocks: None,
            receiver_ids: Vec::new(),
            metadata: None,
            unfurl: true,
        }
    }

    pub fn in_thread(mut self, thread_ts: impl Into<MessageTs>) -> Self {
        self.thread_ts = Some(thread_ts.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = Some(blocks);
        self
    }

    pub fn receivers(mut self, receiver_ids: Vec<UserId>) -> Self {
        self.receiver_ids = receiver_ids;
        self
    }

    pub fn metadata(mut self, metadata: MessageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn unfurl(mut self, unfurl: bool) -> Self {
        self.unfurl = unfurl;
        self
    }

    /// Requires text or blocks; empty values count as missing. Both may be
    /// set, in which case `text` is the notification fallback for the blocks.
    pub fn validate(&self) -> Result<(), BotError> {
        let has_text = self.text.as_deref().is_some_and(|t| !t.is_empty());
        let has_blocks = self.blocks.as_ref().is_some_and(|b| !b.is_empty());
        if !has_text && !has_blocks {
            return Err(BotError::InvalidArgument(
                "one of `text` or `blocks` must be provided".to_string(),
            ));
        }
        Ok(())
    }

    fn to_message(&self, user: Option<&UserId>) -> OutgoingMessage {
        OutgoingMessage {
            channel: self.channel.clone(),
            user: user.cloned(),
            thread_ts: self.thread_ts.clone(),
            text: self.text.clone(),
            blocks: self.blocks.clone(),
            metadata: self.metadata.clone(),
            unfurl_links: self.unfurl,
            unfurl_media: self.unfurl,
        }
    }
}

impl<A: SlackApi> BotClient<A> {
    /// Posts the reply, retrying the whole delivery with exponential backoff.
    ///
    /// Validation happens before any network call. A retry re-sends to every
    /// receiver, so receivers reached before the failure may get duplicates.
    pub async fn respond_in_thread(&self, request: &PostRequest) -> Result<(), BotError> {
        request.validate()?;

        let logger = ChannelLogger::for_channel(&request.channel);
        let result = retry_with_backoff(self.retry, self.retry_policy, || {
            self.deliver(request)
        })
        .await;

        result.into_result().map_err(|e| {
            logger.error(&format!("Failed to post message: {e}"));
            BotError::Api(e)
        })
    }

    async fn deliver(&self, request: &PostRequest) -> Result<(), SlackApiError> {
        if request.receiver_ids.is_empty() {
            self.api.post_message(&request.to_message(None)).await?;
            return Ok(());
        }
        for receiver in &request.receiver_ids {
            self.api
                .post_ephemeral(&request.to_message(Some(receiver)))
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::{RetryConfig, RetryPolicy};
    use crate::test_utils::StubSlackApi;
    use std::time::Duration;

    fn fast_retry(max_attempts: u32) -> RetryConfig {
        RetryConfig::new(
            max_attempts,
            Duration::from_millis(1),
            Duration::from_millis(5),
            2.0,
        )
    }

    fn rate_limited() -> SlackApiError {
        SlackApiError::from_slack_error("chat.postMessage", "ratelimited", None)
    }

    #[tokio::test]
    async fn missing_text_and_blocks_fails_before_any_call() {
        let client = BotClient::new(StubSlackApi::new());
        let err = client
            .respond_in_thread(&PostRequest::new("C1").in_thread("1.0"))
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::InvalidArgument(_)));

        let err = client
            .respond_in_thread(&PostRequest::new("C1").text("").blocks(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::InvalidArgument(_)));

        assert_eq!(client.api().total_calls(), 0);
    }

    #[tokio::test]
    async fn text_rides_along_with_blocks() {
        let client = BotClient::new(StubSlackApi::new());
        let request = PostRequest::new("C1")
            .text("fallback")
            .blocks(vec![Block::section("rich answer")]);
        assert!(request.validate().is_ok());

        client.respond_in_thread(&request).await.unwrap();

        let posted = client.api().posted();
        assert_eq!(posted[0].text.as_deref(), Some("fallback"));
        assert_eq!(posted[0].blocks.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn posts_to_channel_thread() {
        let client = BotClient::new(StubSlackApi::new());
        let request = PostRequest::new("C1")
            .in_thread("1700000000.000100")
            .text("answer")
            .unfurl(false);

        client.respond_in_thread(&request).await.unwrap();

        let posted = client.api().posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].channel.as_str(), "C1");
        assert_eq!(
            posted[0].thread_ts.as_ref().map(MessageTs::as_str),
            Some("1700000000.000100")
        );
        assert_eq!(posted[0].user, None);
        assert!(!posted[0].unfurl_links);
        assert!(!posted[0].unfurl_media);
        assert_eq!(client.api().calls("chat.postEphemeral"), 0);
    }

    #[tokio::test]
    async fn ephemeral_goes_to_each_receiver() {
        let client = BotClient::new(StubSlackApi::new());
        let request = PostRequest::new("C1")
            .blocks(vec![Block::section("only for you")])
            .receivers(vec![UserId::new("U1"), UserId::new("U2")]);

        client.respond_in_thread(&request).await.unwrap();

        let sent = client.api().ephemeral();
        let users: Vec<_> = sent
            .iter()
            .map(|m| m.user.as_ref().map(UserId::as_str))
            .collect();
        assert_eq!(users, vec![Some("U1"), Some("U2")]);
        assert!(sent.iter().all(|m| m.unfurl_links && m.unfurl_media));
        assert_eq!(client.api().calls("chat.postMessage"), 0);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let api = StubSlackApi::new().with_post_results(vec![
            Err(rate_limited()),
            Err(rate_limited()),
        ]);
        let client = BotClient::new(api).with_retry(fast_retry(5), RetryPolicy::RetryAll);

        client
            .respond_in_thread(&PostRequest::new("C1").text("hi"))
            .await
            .unwrap();

        assert_eq!(client.api().calls("chat.postMessage"), 3);
    }

    #[tokio::test]
    async fn exhaustion_surfaces_last_error() {
        let api = StubSlackApi::new().with_post_results(vec![
            Err(rate_limited()),
            Err(SlackApiError::from_slack_error(
                "chat.postMessage",
                "channel_not_found",
                None,
            )),
        ]);
        let client = BotClient::new(api).with_retry(fast_retry(2), RetryPolicy::RetryAll);

        let err = client
            .respond_in_thread(&PostRequest::new("C1").text("hi"))
            .await
            .unwrap_err();

        match err {
            BotError::Api(e) => assert_eq!(e.slack_error.as_deref(), Some("channel_not_found")),
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(client.api().calls("chat.postMessage"), 2);
    }

    #[tokio::test]
    async fn ephemeral_retry_resends_to_all_receivers() {
        // Second receiver fails once; the retry starts from the first again.
        let api = StubSlackApi::new()
            .with_post_results(vec![Ok(Default::default()), Err(rate_limited())]);
        let client = BotClient::new(api).with_retry(fast_retry(3), RetryPolicy::RetryAll);
        let request = PostRequest::new("C1")
            .text("hi")
            .receivers(vec![UserId::new("U1"), UserId::new("U2")]);

        client.respond_in_thread(&request).await.unwrap();

        assert_eq!(client.api().calls("chat.postEphemeral"), 4);
    }
}
