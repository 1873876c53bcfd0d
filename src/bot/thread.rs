//! Reading a Slack thread back as conversation history.
//!
//! The bot's own answers are posted as blocks: a header, then the answer
//! body. When the question was scoped by filters, a disclaimer block sits
//! between the two.

use std::collections::HashSet;

use super::{BotClient, BotError, ChannelLogger};
use crate::slack::{SlackApi, SlackApiError, ThreadReply};
use crate::types::{ChannelId, MessageTs, ThreadMessage};

/// How the filter disclaimer block starts.
pub const FILTERS_DISCLAIMER_PREFIX: &str = "_Filters";

impl<A: SlackApi> BotClient<A> {
    /// Every message in the thread, root included, following pagination.
    ///
    /// Stops at the first cursor that was already followed, so a server
    /// handing back an earlier cursor cannot loop the fetch.
    pub async fn fetch_thread_replies(
        &self,
        channel: &ChannelId,
        thread_ts: &MessageTs,
    ) -> Result<Vec<ThreadReply>, SlackApiError> {
        let mut replies = Vec::new();
        let mut seen_cursors = HashSet::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .api
                .conversations_replies(channel, thread_ts, cursor.as_deref())
                .await?;
            replies.extend(page.messages);
            match page.next_cursor {
                Some(next) if seen_cursors.insert(next.clone()) => cursor = Some(next),
                Some(next) => {
                    ChannelLogger::for_channel(channel)
                        .warn(&format!("Stopping thread fetch at repeated cursor {next}"));
                    break;
                }
                None => break,
            }
        }
        Ok(replies)
    }

    /// Converts a thread into the history the answer pipeline consumes.
    ///
    /// Human replies keep their text minus the bot mention. This bot's
    /// replies contribute their answer body. Replies from other integrations
    /// and malformed bot replies are skipped.
    pub async fn read_slack_thread(
        &self,
        channel: &ChannelId,
        thread_ts: &MessageTs,
    ) -> Result<Vec<ThreadMessage>, BotError> {
        let logger = ChannelLogger::for_channel(channel);
        let replies = self.fetch_thread_replies(channel, thread_ts).await?;
        let mut messages = Vec::with_capacity(replies.len());

        for reply in &replies {
            if reply.is_from_human()
                && let Some(user) = &reply.user
            {
                let text = self
                    .remove_bot_tag(reply.text.as_deref().unwrap_or_default())
                    .await?;
                let sender = self.fetch_user_semantic_id(user).await?;
                messages.push(ThreadMessage::user(text, sender));
                continue;
            }

            // Other bots are not taken in as context.
            let bot = self.bot_user_id().await?;
            if reply.user.as_ref() != Some(bot) {
                continue;
            }

            match assistant_body(reply) {
                Some(body) => messages.push(ThreadMessage::assistant(body)),
                None => logger.debug(&format!(
                    "Skipping bot reply {} without an answer block",
                    reply.ts.as_ref().map(MessageTs::as_str).unwrap_or("<no ts>")
                )),
            }
        }

        Ok(messages)
    }
}

/// The answer text of one of the bot's replies.
fn assistant_body(reply: &ThreadReply) -> Option<&str> {
    let blocks = &reply.blocks;
    if blocks.len() <= 1 {
        return None;
    }
    let body = blocks[1].text()?;
    if body.starts_with(FILTERS_DISCLAIMER_PREFIX) {
        return blocks.get(2)?.text();
    }
    Some(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::Block;
    use crate::test_utils::{StubSlackApi, bot_reply, human_reply, slack_user};
    use crate::types::{MessageRole, UserId};

    fn channel() -> ChannelId {
        ChannelId::new("C1")
    }

    fn thread() -> MessageTs {
        MessageTs::new("1700000000.000100")
    }

    #[tokio::test]
    async fn human_reply_becomes_user_message() {
        let api = StubSlackApi::new()
            .with_user(slack_user("U1", Some("Jane Doe"), Some("jdoe"), None))
            .with_thread(vec![human_reply("U1", "<@UBOT> how do I deploy?")]);
        let client = BotClient::new(api);

        let messages = client.read_slack_thread(&channel(), &thread()).await.unwrap();

        assert_eq!(
            messages,
            vec![ThreadMessage::user(
                "how do I deploy?",
                Some("Jane Doe".to_string())
            )]
        );
    }

    #[tokio::test]
    async fn unknown_user_has_no_sender() {
        let api = StubSlackApi::new().with_thread(vec![human_reply("U404", "hello")]);
        let client = BotClient::new(api);

        let messages = client.read_slack_thread(&channel(), &thread()).await.unwrap();

        assert_eq!(messages, vec![ThreadMessage::user("hello", None)]);
    }

    #[tokio::test]
    async fn assistant_reply_uses_second_block() {
        let api = StubSlackApi::new().with_thread(vec![bot_reply(
            "UBOT",
            "B1",
            vec![Block::header("AI Answer"), Block::section("Use the deploy script.")],
        )]);
        let client = BotClient::new(api);

        let messages = client.read_slack_thread(&channel(), &thread()).await.unwrap();

        assert_eq!(
            messages,
            vec![ThreadMessage::assistant("Use the deploy script.")]
        );
        assert_eq!(messages[0].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn filter_disclaimer_moves_body_to_third_block() {
        let api = StubSlackApi::new().with_thread(vec![bot_reply(
            "UBOT",
            "B1",
            vec![
                Block::header("AI Answer"),
                Block::section("_Filters: Sources: confluence_"),
                Block::section("Filtered answer."),
            ],
        )]);
        let client = BotClient::new(api);

        let messages = client.read_slack_thread(&channel(), &thread()).await.unwrap();

        assert_eq!(messages, vec![ThreadMessage::assistant("Filtered answer.")]);
    }

    #[tokio::test]
    async fn malformed_and_foreign_bot_replies_are_skipped() {
        let api = StubSlackApi::new().with_thread(vec![
            // Another integration.
            bot_reply(
                "UOTHER",
                "B2",
                vec![Block::header("Bot"), Block::section("not ours")],
            ),
            // Ours, header only.
            bot_reply("UBOT", "B1", vec![Block::header("AI Answer")]),
            // Ours, disclaimer with nothing after it.
            bot_reply(
                "UBOT",
                "B1",
                vec![Block::header("AI Answer"), Block::section("_Filters: none_")],
            ),
            // Ours, body block without text.
            bot_reply(
                "UBOT",
                "B1",
                vec![Block::header("AI Answer"), Block(serde_json::json!({"type": "divider"}))],
            ),
            // A bot message with no user at all.
            ThreadReply {
                bot_id: Some("B3".to_string()),
                text: Some("webhook".to_string()),
                ..Default::default()
            },
        ]);
        let client = BotClient::new(api);

        let messages = client.read_slack_thread(&channel(), &thread()).await.unwrap();

        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn conversation_order_is_preserved_across_pages() {
        let api = StubSlackApi::new()
            .with_user(slack_user("U1", None, Some("jdoe"), None))
            .with_reply_pages(vec![
                vec![human_reply("U1", "<@UBOT> first")],
                vec![
                    bot_reply(
                        "UBOT",
                        "B1",
                        vec![Block::header("AI Answer"), Block::section("answer")],
                    ),
                    human_reply("U1", "follow-up"),
                ],
            ]);
        let client = BotClient::new(api);

        let messages = client.read_slack_thread(&channel(), &thread()).await.unwrap();

        assert_eq!(
            messages,
            vec![
                ThreadMessage::user("first", Some("jdoe".to_string())),
                ThreadMessage::assistant("answer"),
                ThreadMessage::user("follow-up", Some("jdoe".to_string())),
            ]
        );
        assert_eq!(client.api().calls("conversations.replies"), 2);
        assert_eq!(client.api().calls("auth.test"), 1);
    }

    #[tokio::test]
    async fn cycling_cursor_stops_pagination() {
        // 0 -> 1 -> 2 -> back to 1.
        let api = StubSlackApi::new()
            .with_reply_pages(vec![
                vec![human_reply("U1", "a")],
                vec![human_reply("U1", "b")],
                vec![human_reply("U1", "c")],
            ])
            .with_last_page_cursor("1");
        let client = BotClient::new(api);

        let replies = client
            .fetch_thread_replies(&channel(), &thread())
            .await
            .unwrap();

        let texts: Vec<_> = replies.iter().filter_map(|r| r.text.as_deref()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert_eq!(client.api().calls("conversations.replies"), 3);
    }

    #[tokio::test]
    async fn thread_fetch_failure_propagates() {
        let api = StubSlackApi::new().with_replies_error(SlackApiError::from_slack_error(
            "conversations.replies",
            "thread_not_found",
            None,
        ));
        let client = BotClient::new(api);

        let err = client
            .read_slack_thread(&channel(), &thread())
            .await
            .unwrap_err();

        assert!(matches!(err, BotError::Api(_)));
    }

    #[test]
    fn assistant_body_needs_two_blocks() {
        let reply = ThreadReply {
            user: Some(UserId::new("UBOT")),
            blocks: vec![Block::section("only")],
            ..Default::default()
        };
        assert_eq!(assistant_body(&reply), None);
    }
}
