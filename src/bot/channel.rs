//! Channel lookups.

use super::{BotClient, ChannelLogger};
use crate::slack::{ChannelInfo, SlackApi, SlackApiError};
use crate::types::ChannelId;

impl<A: SlackApi> BotClient<A> {
    pub async fn get_channel_from_id(
        &self,
        channel_id: &ChannelId,
    ) -> Result<ChannelInfo, SlackApiError> {
        self.api.conversations_info(channel_id).await
    }

    /// The channel's name and whether it is a direct message.
    ///
    /// Failures are logged with the channel id and returned as-is.
    pub async fn get_channel_name_from_id(
        &self,
        channel_id: &ChannelId,
    ) -> Result<(Option<String>, bool), SlackApiError> {
        match self.get_channel_from_id(channel_id).await {
            Ok(channel) => {
                let is_dm = channel.is_dm();
                Ok((channel.name, is_dm))
            }
            Err(e) => {
                ChannelLogger::for_channel(channel_id)
                    .error(&format!("Couldn't fetch channel name from id: {e}"));
                Err(e)
            }
        }
    }
}
