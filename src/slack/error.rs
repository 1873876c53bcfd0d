//! Slack Web API error types.
//!
//! Slack reports failures two ways: an HTTP status (429 when rate limited,
//! 5xx on outages) or HTTP 200 with `{"ok": false, "error": "<code>"}`. Both
//! are folded into [`SlackApiError`] and classified for the retry loop:
//!
//! - **Transient**: 429, 5xx, network failures, and the error codes Slack
//!   documents as temporary (`ratelimited`, `internal_error`, …)
//! - **Permanent**: everything else (`channel_not_found`, `not_in_channel`,
//!   `invalid_auth`, …)

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Slack error codes that are worth retrying.
const TRANSIENT_SLACK_ERRORS: &[&str] = &[
    "ratelimited",
    "internal_error",
    "fatal_error",
    "service_unavailable",
    "request_timeout",
];

/// The kind of Slack API error, categorized for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlackErrorKind {
    /// Safe to retry with backoff.
    Transient,

    /// Retrying will not help; the request or the workspace setup is wrong.
    Permanent,
}

impl SlackErrorKind {
    pub fn is_retriable(&self) -> bool {
        matches!(self, SlackErrorKind::Transient)
    }
}

/// A failed Slack Web API call.
#[derive(Debug, Error)]
pub struct SlackApiError {
    pub kind: SlackErrorKind,

    /// The API method, e.g. `chat.postMessage`.
    pub method: &'static str,

    /// HTTP status when the failure was not a 200.
    pub status_code: Option<u16>,

    /// The `error` code from an `ok: false` body.
    pub slack_error: Option<String>,

    pub message: String,

    /// Server-requested wait from a `Retry-After` header.
    pub retry_after: Option<Duration>,

    #[source]
    pub source: Option<reqwest::Error>,
}

impl fmt::Display for SlackApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(
                f,
                "Slack API error in {} (HTTP {}): {}",
                self.method, code, self.message
            ),
            None => write!(f, "Slack API error in {}: {}", self.method, self.message),
        }
    }
}

impl SlackApiError {
    /// An `ok: false` response carrying Slack's error code.
    pub fn from_slack_error(
        method: &'static str,
        code: impl Into<String>,
        retry_after: Option<Duration>,
    ) -> Self {
        let code = code.into();
        let kind = if TRANSIENT_SLACK_ERRORS.contains(&code.as_str()) {
            SlackErrorKind::Transient
        } else {
            SlackErrorKind::Permanent
        };
        Self {
            kind,
            method,
            status_code: None,
            message: format!("Slack returned error `{code}`"),
            slack_error: Some(code),
            retry_after,
            source: None,
        }
    }

    /// A non-2xx HTTP response.
    pub fn from_http_status(
        method: &'static str,
        status: u16,
        body: &str,
        retry_after: Option<Duration>,
    ) -> Self {
        let kind = match status {
            429 => SlackErrorKind::Transient,
            code if (500..600).contains(&code) => SlackErrorKind::Transient,
            _ => SlackErrorKind::Permanent,
        };
        Self {
            kind,
            method,
            status_code: Some(status),
            slack_error: None,
            message: truncate_for_error(body, 500),
            retry_after,
            source: None,
        }
    }

    /// A failure inside reqwest: connect, timeout, or body decoding.
    pub fn from_reqwest(method: &'static str, err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() || err.is_connect() || err.is_request() {
            SlackErrorKind::Transient
        } else {
            SlackErrorKind::Permanent
        };
        Self {
            kind,
            method,
            status_code: err.status().map(|s| s.as_u16()),
            slack_error: None,
            message: err.to_string(),
            retry_after: None,
            source: Some(err),
        }
    }

    /// An `ok: true` body that did not have the expected shape.
    pub fn malformed_response(method: &'static str, err: serde_json::Error) -> Self {
        Self::permanent_without_source(method, format!("unexpected response shape: {err}"))
    }

    pub fn transient_without_source(method: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: SlackErrorKind::Transient,
            method,
            status_code: None,
            slack_error: None,
            message: message.into(),
            retry_after: None,
            source: None,
        }
    }

    pub fn permanent_without_source(method: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: SlackErrorKind::Permanent,
            method,
            status_code: None,
            slack_error: None,
            message: message.into(),
            retry_after: None,
            source: None,
        }
    }

    /// True for a well-formed `ok: false` answer, as opposed to a transport failure.
    pub fn is_slack_rejection(&self) -> bool {
        self.slack_error.is_some()
    }
}

fn truncate_for_error(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        return body.to_string();
    }
    let mut out: String = body.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
