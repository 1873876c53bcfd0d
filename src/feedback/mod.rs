//! Feedback block identifiers embedded in interactive Slack elements.

mod block_id;

pub use block_id::{
    FeedbackId, FeedbackIdError, ID_SEPARATOR, PREFIX_LEN, build_feedback_block_id,
    decompose_block_id, random_prefix,
};
