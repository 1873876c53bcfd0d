//! Logging setup and the channel-scoped logger.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::types::ChannelId;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, or by
/// `default_filter` when `RUST_LOG` is unset. Later calls are no-ops.
pub fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Logs with a `[Channel ID: …]` prefix when the channel is known, and
/// records it as the `channel_id` field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelLogger {
    channel_id: Option<ChannelId>,
}

impl ChannelLogger {
    pub fn new(channel_id: Option<ChannelId>) -> Self {
        Self { channel_id }
    }

    pub fn for_channel(channel_id: &ChannelId) -> Self {
        Self::new(Some(channel_id.clone()))
    }

    pub fn channel_id(&self) -> Option<&ChannelId> {
        self.channel_id.as_ref()
    }

    /// The message as it will be logged.
    pub fn format(&self, message: &str) -> String {
        match &self.channel_id {
            Some(id) if !id.as_str().is_empty() => format!("[Channel ID: {id}] {message}"),
            _ => message.to_string(),
        }
    }

    fn field(&self) -> Option<&str> {
        self.channel_id.as_ref().map(ChannelId::as_str)
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(channel_id = self.field(), "{}", self.format(message));
    }

    pub fn info(&self, message: &str) {
        tracing::info!(channel_id = self.field(), "{}", self.format(message));
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(channel_id = self.field(), "{}", self.format(message));
    }

    pub fn error(&self, message: &str) {
        tracing::error!(channel_id = self.field(), "{}", self.format(message));
    }
}
