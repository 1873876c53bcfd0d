//! Resolving Slack users.

use super::{BotClient, BotError};
use crate::slack::{SlackApi, SlackApiError};
use crate::types::UserId;

impl<A: SlackApi> BotClient<A> {
    /// Looks up each email; ones without a Slack account are logged and
    /// skipped. Fails only when none resolve.
    pub async fn fetch_user_ids_from_emails<S: AsRef<str>>(
        &self,
        emails: &[S],
    ) -> Result<Vec<UserId>, BotError> {
        let mut user_ids = Vec::with_capacity(emails.len());
        for email in emails {
            let email = email.as_ref();
            match self.api.users_lookup_by_email(email).await {
                Ok(user) => user_ids.push(user.id),
                Err(e) => {
                    tracing::error!(email, error = %e, "Was not able to find Slack user by email");
                }
            }
        }

        if user_ids.is_empty() {
            return Err(BotError::NoUsersResolved);
        }
        Ok(user_ids)
    }

    /// Display name for a user id: real name, handle, or email.
    ///
    /// `Ok(None)` when Slack refuses the lookup or the user has none of
    /// these; transport failures are returned.
    pub async fn fetch_user_semantic_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<String>, SlackApiError> {
        match self.api.users_info(user_id).await {
            Ok(user) => Ok(user.semantic_id().map(str::to_string)),
            Err(e) if e.is_slack_rejection() => {
                tracing::debug!(user_id = %user_id, error = %e, "Could not resolve user name");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
