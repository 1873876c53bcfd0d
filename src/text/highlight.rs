//! Turning search-engine highlight markup into Slack emphasis.
//!
//! The retrieval layer wraps matched terms in `<hi>`/`</hi>`. Slack renders
//! `*term*` as bold, but only at word boundaries, so a highlight that starts
//! mid-word is dropped instead of converted.

/// Opening highlight marker.
pub const HIGHLIGHT_OPEN: &str = "<hi>";

/// Closing highlight marker.
pub const HIGHLIGHT_CLOSE: &str = "</hi>";

/// Slack's emphasis marker.
pub const SLACK_EMPHASIS: char = '*';

/// Total characters a snippet block may use before Slack desktop folds it
/// behind "Show more".
pub const SNIPPET_DISPLAY_BUDGET: usize = 300;

/// Separator placed between fragments.
pub const FRAGMENT_SEPARATOR: &str = "... ";

const ELLIPSIS: &str = "...";

/// Converts highlighted fragments into one Slack-formatted snippet.
///
/// `used_chars` is what the surrounding block already spends (title, links).
/// The snippet is cut to `SNIPPET_DISPLAY_BUDGET - used_chars` characters,
/// ellipsis included, unless an emphasis marker sits at or past the cut. A
/// visible match is worth more than a tidy length.
pub fn translate_highlight_to_slack<S: AsRef<str>>(match_strs: &[S], used_chars: usize) -> String {
    let fragments: Vec<String> = match_strs
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.is_empty())
        .map(|s| {
            replace_whitespaces_with_space(&replace_highlight(s))
                .trim()
                .to_string()
        })
        .collect();
    let combined = fragments.join(FRAGMENT_SEPARATOR);

    let budget = i64::try_from(SNIPPET_DISPLAY_BUDGET).unwrap_or(i64::MAX);
    let used = i64::try_from(used_chars).unwrap_or(i64::MAX);
    let remaining = budget.saturating_sub(used);

    let chars: Vec<char> = combined.chars().collect();
    let len = chars.len() as i64;
    if len > remaining && !chars[slice_index(remaining, len)..].contains(&SLACK_EMPHASIS) {
        let end = slice_index(remaining - 3, len);
        let mut truncated: String = chars[..end].iter().collect();
        truncated.push_str(ELLIPSIS);
        return truncated;
    }
    combined
}

/// Replaces every whitespace character with a plain space.
pub fn replace_whitespaces_with_space(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect()
}

fn replace_highlight(s: &str) -> String {
    strip_mid_word_highlights(s)
        .replace(HIGHLIGHT_CLOSE, "*")
        .replace(HIGHLIGHT_OPEN, "*")
}

/// Removes the markers of every highlight whose opening marker directly
/// follows a non-whitespace character.
///
/// The pair closes at the nearest `</hi>`, and never across a newline.
fn strip_mid_word_highlights(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut copied_to = 0;
    let mut search_from = 0;

    while let Some(offset) = s[search_from..].find(HIGHLIGHT_OPEN) {
        let open = search_from + offset;
        let inner_start = open + HIGHLIGHT_OPEN.len();
        search_from = inner_start;

        let mid_word = s[..open]
            .chars()
            .next_back()
            .is_some_and(|c| !c.is_whitespace());
        if !mid_word {
            continue;
        }
        let Some(inner_len) = s[inner_start..].find(HIGHLIGHT_CLOSE) else {
            continue;
        };
        let inner = &s[inner_start..inner_start + inner_len];
        if inner.contains('\n') {
            continue;
        }

        out.push_str(&s[copied_to..open]);
        out.push_str(inner);
        copied_to = inner_start + inner_len + HIGHLIGHT_CLOSE.len();
        search_from = copied_to;
    }

    out.push_str(&s[copied_to..]);
    out
}

/// Resolves a possibly negative index the way end-relative slicing does:
/// negative values count back from `len`, and results clamp to `0..=len`.
fn slice_index(index: i64, len: i64) -> usize {
    let resolved = if index < 0 { len + index } else { index };
    resolved.clamp(0, len) as usize
}
