//! Feedback block identifiers.
//!
//! Interactive elements (the 👍/👎 buttons under an answer, or under a single
//! cited document) carry a `block_id` that ties the click back to the answer.
//! The wire format is:
//!
//! ```text
//! <prefix>:;:<message_id>                               (whole answer)
//! <prefix>:;:<message_id>:;:<document_id>:;:<rank>      (one document)
//! ```
//!
//! The prefix is ten random ASCII letters. Slack collapses blocks with equal
//! ids, and the same answer can be rendered more than once in a channel.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use thiserror::Error;

/// Separator between the fields of a feedback block id.
pub const ID_SEPARATOR: &str = ":;:";

/// Length of the random prefix.
pub const PREFIX_LEN: usize = 10;

const PREFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Errors from building or reading a feedback block id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackIdError {
    /// A document id was given, but it was empty or had no rank.
    #[error("invalid document, missing information")]
    MissingDocumentInfo,

    /// The document id would produce an extra field once joined.
    #[error("separator pattern should not already exist in document id")]
    SeparatorInDocumentId,

    /// The prefix would produce an extra field once joined.
    #[error("block id prefix must not contain the separator pattern")]
    InvalidPrefix,

    /// The token could not be decoded. The cause is logged, not returned.
    #[error("received invalid feedback block identifier")]
    InvalidBlockId,
}

/// What a piece of feedback refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedbackId {
    /// Feedback on a whole answer.
    Message { message_id: i64 },

    /// Feedback on one document cited by an answer.
    Document {
        message_id: i64,
        document_id: String,
        document_rank: i64,
    },
}

impl FeedbackId {
    /// Builds a feedback id from the optional triple callers usually hold.
    ///
    /// A rank without a document id is ignored.
    pub fn new(
        message_id: i64,
        document_id: Option<String>,
        document_rank: Option<i64>,
    ) -> Result<Self, FeedbackIdError> {
        let Some(document_id) = document_id else {
            return Ok(FeedbackId::Message { message_id });
        };
        let document_rank = match document_rank {
            Some(rank) if !document_id.is_empty() => rank,
            _ => return Err(FeedbackIdError::MissingDocumentInfo),
        };
        validate_document_id(&document_id)?;
        Ok(FeedbackId::Document {
            message_id,
            document_id,
            document_rank,
        })
    }

    pub fn message_id(&self) -> i64 {
        match self {
            FeedbackId::Message { message_id } | FeedbackId::Document { message_id, .. } => {
                *message_id
            }
        }
    }

    /// Encodes with a fresh random prefix.
    pub fn encode(&self) -> Result<String, FeedbackIdError> {
        self.encode_with_prefix(&random_prefix())
    }

    /// Encodes with the given prefix. The prefix must not contain the separator
    /// or end in a way that merges with it.
    pub fn encode_with_prefix(&self, prefix: &str) -> Result<String, FeedbackIdError> {
        if !ends_cleanly_before_separator(prefix) {
            return Err(FeedbackIdError::InvalidPrefix);
        }
        let payload = match self {
            FeedbackId::Message { message_id } => message_id.to_string(),
            FeedbackId::Document {
                message_id,
                document_id,
                document_rank,
            } => {
                // The variant is public, so it may not have gone through `new`.
                if document_id.is_empty() {
                    return Err(FeedbackIdError::MissingDocumentInfo);
                }
                validate_document_id(document_id)?;
                [
                    message_id.to_string(),
                    document_id.clone(),
                    document_rank.to_string(),
                ]
                .join(ID_SEPARATOR)
            }
        };
        Ok(format!("{prefix}{ID_SEPARATOR}{payload}"))
    }

    /// Decodes a block id produced by [`FeedbackId::encode`].
    ///
    /// Any failure is logged with its cause and reported as
    /// [`FeedbackIdError::InvalidBlockId`].
    pub fn decode(block_id: &str) -> Result<Self, FeedbackIdError> {
        parse_components(block_id).map_err(|reason| {
            tracing::error!(block_id, %reason, "Failed to decode feedback block id");
            FeedbackIdError::InvalidBlockId
        })
    }

    /// Splits into `(message_id, document_id, document_rank)`.
    pub fn into_parts(self) -> (i64, Option<String>, Option<i64>) {
        match self {
            FeedbackId::Message { message_id } => (message_id, None, None),
            FeedbackId::Document {
                message_id,
                document_id,
                document_rank,
            } => (message_id, Some(document_id), Some(document_rank)),
        }
    }
}

impl FromStr for FeedbackId {
    type Err = FeedbackIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeedbackId::decode(s)
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackId::Message { message_id } => write!(f, "message {message_id}"),
            FeedbackId::Document {
                message_id,
                document_id,
                document_rank,
            } => write!(
                f,
                "message {message_id}, document {document_id} (rank {document_rank})"
            ),
        }
    }
}

/// Builds a block id for feedback on an answer or on one of its documents.
pub fn build_feedback_block_id(
    message_id: i64,
    document_id: Option<&str>,
    document_rank: Option<i64>,
) -> Result<String, FeedbackIdError> {
    FeedbackId::new(message_id, document_id.map(str::to_string), document_rank)?.encode()
}

/// Decomposes a block id into `(message_id, document_id, document_rank)`.
pub fn decompose_block_id(
    block_id: &str,
) -> Result<(i64, Option<String>, Option<i64>), FeedbackIdError> {
    FeedbackId::decode(block_id).map(FeedbackId::into_parts)
}

/// Ten random ASCII letters.
pub fn random_prefix() -> String {
    let mut rng = rand::thread_rng();
    (0..PREFIX_LEN)
        .map(|_| PREFIX_ALPHABET[rng.gen_range(0..PREFIX_ALPHABET.len())] as char)
        .collect()
}

fn validate_document_id(document_id: &str) -> Result<(), FeedbackIdError> {
    if !ends_cleanly_before_separator(document_id) {
        return Err(FeedbackIdError::SeparatorInDocumentId);
    }
    Ok(())
}

/// False for fields containing the separator, and for fields whose tail would
/// form one with the separator that follows them (e.g. a trailing `":;"`).
fn ends_cleanly_before_separator(field: &str) -> bool {
    let joined = format!("{field}{ID_SEPARATOR}");
    joined.find(ID_SEPARATOR) == Some(field.len())
}

fn parse_components(block_id: &str) -> Result<FeedbackId, String> {
    let components: Vec<&str> = block_id.split(ID_SEPARATOR).collect();
    match components.as_slice() {
        [_prefix, message_id] => Ok(FeedbackId::Message {
            message_id: parse_int("message id", message_id)?,
        }),
        [_prefix, message_id, document_id, document_rank] => Ok(FeedbackId::Document {
            message_id: parse_int("message id", message_id)?,
            document_id: (*document_id).to_string(),
            document_rank: parse_int("document rank", document_rank)?,
        }),
        other => Err(format!(
            "block id has {} components, expected 2 or 4",
            other.len()
        )),
    }
}

fn parse_int(field: &str, raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse()
        .map_err(|e| format!("{field} {raw:?} is not an integer: {e}"))
}
