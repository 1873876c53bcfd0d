//! Text transforms for Slack output: snippet highlighting and markup cleanup.

pub mod clean;
pub mod highlight;

pub use clean::remove_slack_text_interactions;
pub use highlight::{
    SNIPPET_DISPLAY_BUDGET, replace_whitespaces_with_space, translate_highlight_to_slack,
};
