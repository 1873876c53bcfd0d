//! Manual smoke test against a real Slack workspace.
//!
//! # Usage
//!
//! 1. Set `ANSWER_BOT_SLACK_BOT_TOKEN` to a bot token (`xoxb-...`) with the
//!    `chat:write`, `channels:history`, `channels:read`, `users:read` and
//!    `users:read.email` scopes.
//!
//! 2. Set `SMOKE_CHANNEL` to a channel id the bot is a member of.
//!
//! 3. Optionally set `SMOKE_THREAD_TS` to the ts of a thread to read back,
//!    and `SMOKE_EMAIL` to an email to resolve.
//!
//! 4. Run: `cargo run --example slack_smoke`
//!
//! Posting is skipped unless `ENABLE_POSTING` is set.

use std::env;

use slack_answer_bot::bot::init_tracing;
use slack_answer_bot::slack::Block;
use slack_answer_bot::types::{ChannelId, MessageTs};
use slack_answer_bot::{
    BotClient, BotConfig, EnvTokenSource, PostRequest, build_feedback_block_id,
    translate_highlight_to_slack,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info,slack_answer_bot=debug");

    let channel = env::var("SMOKE_CHANNEL")
        .map(ChannelId::from)
        .map_err(|_| anyhow::anyhow!("SMOKE_CHANNEL environment variable not set"))?;
    let thread_ts = env::var("SMOKE_THREAD_TS").ok().map(MessageTs::from);
    let email = env::var("SMOKE_EMAIL").ok();

    let config = BotConfig::from_env();
    let bot = BotClient::connect(&config, &EnvTokenSource)?;

    println!("\n=== Slack Smoke Test ===\n");
    println!("API base: {}", config.api_base);
    println!("Channel: {}", channel);
    println!();

    let mut passed = 0;
    let mut failed = 0;
    let mut skipped = 0;

    // ─── Identity ────────────────────────────────────────────────────────────

    println!("--- Identity ---");

    match bot.bot_user_id().await {
        Ok(user_id) => {
            println!("  [PASS] auth.test (bot user: {})", user_id);
            passed += 1;
        }
        Err(e) => {
            println!("  [FAIL] auth.test: {}", e);
            failed += 1;
        }
    }

    match bot.get_channel_name_from_id(&channel).await {
        Ok((name, is_dm)) => {
            println!(
                "  [PASS] conversations.info (name: {:?}, dm: {})",
                name, is_dm
            );
            passed += 1;
        }
        Err(e) => {
            println!("  [FAIL] conversations.info: {}", e);
            failed += 1;
        }
    }

    match &email {
        Some(email) => match bot.fetch_user_ids_from_emails(&[email.as_str()]).await {
            Ok(ids) => {
                println!("  [PASS] users.lookupByEmail ({:?})", ids);
                passed += 1;
            }
            Err(e) => {
                println!("  [FAIL] users.lookupByEmail: {}", e);
                failed += 1;
            }
        },
        None => {
            println!("  [SKIP] users.lookupByEmail (no SMOKE_EMAIL set)");
            skipped += 1;
        }
    }

    // ─── Threads ─────────────────────────────────────────────────────────────

    println!("\n--- Threads ---");

    match &thread_ts {
        Some(ts) => match bot.read_slack_thread(&channel, ts).await {
            Ok(messages) => {
                println!("  [PASS] read_slack_thread ({} messages)", messages.len());
                for message in &messages {
                    println!(
                        "         {:?} {}: {}",
                        message.role,
                        message.sender.as_deref().unwrap_or("?"),
                        message.message
                    );
                }
                passed += 1;
            }
            Err(e) => {
                println!("  [FAIL] read_slack_thread: {}", e);
                failed += 1;
            }
        },
        None => {
            println!("  [SKIP] read_slack_thread (no SMOKE_THREAD_TS set)");
            skipped += 1;
        }
    }

    // ─── Posting ─────────────────────────────────────────────────────────────

    println!("\n--- Posting ---");

    if env::var("ENABLE_POSTING").is_ok() {
        let title = "Slack smoke test";
        let snippet = translate_highlight_to_slack(
            &["the <hi>smoke</hi> test", "ran <hi>end to end</hi>"],
            title.len(),
        );
        let feedback_id = build_feedback_block_id(1, None, None)?;
        let mut section = Block::section(&snippet);
        section.0["block_id"] = feedback_id.clone().into();
        let mut request = PostRequest::new(channel.clone())
            .text(snippet.as_str())
            .blocks(vec![Block::header(title), section]);
        if let Some(ts) = &thread_ts {
            request = request.in_thread(ts.clone());
        }

        match bot.respond_in_thread(&request).await {
            Ok(()) => {
                println!("  [PASS] respond_in_thread (feedback id: {})", feedback_id);
                passed += 1;
            }
            Err(e) => {
                println!("  [FAIL] respond_in_thread: {}", e);
                failed += 1;
            }
        }
    } else {
        println!("  [SKIP] respond_in_thread (set ENABLE_POSTING to run)");
        skipped += 1;
    }

    println!(
        "\n=== Results: {} passed, {} failed, {} skipped ===\n",
        passed, failed, skipped
    );

    if failed > 0 {
        anyhow::bail!("{} checks failed", failed);
    }
    Ok(())
}
