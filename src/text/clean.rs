//! Neutralising Slack markup in text the bot echoes back.
//!
//! Quoting a message verbatim would re-trigger its mentions and unfurl its
//! links. These helpers rewrite Slack's `<…>` escapes into plain text.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static USER_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@(.*?)>").expect("valid user tag pattern"));

static CHANNEL_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<#(.*?)\|(.*?)>").expect("valid channel pattern"));

static ANGLE_BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(.*?)>").expect("valid link pattern"));

static SPECIAL_CATCHALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!([^|]+)\|([^>]+)>").expect("valid catch-all pattern"));

const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// Applies every rewrite below, in order, so the text can be posted without
/// pinging anyone.
pub fn remove_slack_text_interactions(text: &str) -> String {
    let text = replace_tags_basic(text);
    let text = replace_channels_basic(&text);
    let text = replace_special_mentions(&text);
    let text = replace_links(&text);
    let text = replace_special_catchall(&text);
    add_zero_width_whitespace_after_tag(&text)
}

/// `<@U123>` → `@U123`
pub fn replace_tags_basic(text: &str) -> String {
    USER_TAG.replace_all(text, "@${1}").into_owned()
}

/// `<#C123|general>` → `#general`
pub fn replace_channels_basic(text: &str) -> String {
    CHANNEL_REF.replace_all(text, "#${2}").into_owned()
}

/// `<!channel>`, `<!here>`, `<!everyone>` → `@channel`, `@here`, `@everyone`
pub fn replace_special_mentions(text: &str) -> String {
    text.replace("<!channel>", "@channel")
        .replace("<!here>", "@here")
        .replace("<!everyone>", "@everyone")
}

/// `<https://x>` → `https://x`, `<https://x|label>` → `label`.
///
/// Escapes starting with `#`, `@` or `!` are not links and are left alone.
pub fn replace_links(text: &str) -> String {
    ANGLE_BRACKETED
        .replace_all(text, |caps: &Captures<'_>| {
            let inner = &caps[1];
            match inner.chars().next() {
                None | Some('#' | '@' | '!') => caps[0].to_string(),
                Some(_) => match inner.split('|').nth(1) {
                    Some(label) => label.to_string(),
                    None => inner.to_string(),
                },
            }
        })
        .into_owned()
}

/// `<!subteam^S123|@team>` → `@team`
pub fn replace_special_catchall(text: &str) -> String {
    SPECIAL_CATCHALL.replace_all(text, "${2}").into_owned()
}

/// Puts a zero-width space after every `@` so Slack does not resolve it.
pub fn add_zero_width_whitespace_after_tag(text: &str) -> String {
    text.replace('@', &format!("@{ZERO_WIDTH_SPACE}"))
}
