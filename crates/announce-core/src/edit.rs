//! Edit propagation
//!
//! Editing the command message of a cached announcement edits the
//! announcement too. The role is taken from the announcement itself and
//! permissions are not re-checked.

use crate::composer::AnnouncementRenderer;
use crate::parser::edited_body;
use crate::platform::{ChatPlatform, MessageEdit};
use crate::workflow::AnnounceWorkflow;
use tracing::{debug, info, warn};

/// How an edit event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edited message is not a cached trigger
    NotTracked,
    /// The announcement was edited
    Edited,
    /// The announcement no longer carries a usable role mention
    Skipped,
    /// The edit request failed
    Failed,
}

impl<R: AnnouncementRenderer> AnnounceWorkflow<R> {
    /// Propagate an edit of a trigger message to its announcement.
    pub async fn handle_update<P>(&self, platform: &P, edit: &MessageEdit) -> EditOutcome
    where
        P: ChatPlatform + ?Sized,
    {
        let Some(announcement) = self.cache.get(&edit.message_id).await else {
            debug!("Edited message {} is not tracked", edit.message_id);
            return EditOutcome::NotTracked;
        };

        let Some(role_id) = announcement.mentioned_roles.first().copied() else {
            warn!("Announcement {} mentions no role", announcement.id);
            return EditOutcome::Skipped;
        };
        let Some(role) = platform.role(edit.guild_id, role_id) else {
            warn!("Role {role_id} of announcement {} is gone", announcement.id);
            return EditOutcome::Skipped;
        };

        let body = edited_body(&edit.content);
        let text = self.renderer.render(&role, &body, &edit.author);

        match platform.edit_message(&announcement, &text).await {
            Ok(_) => {
                info!(
                    "Propagated edit of {} to announcement {}",
                    edit.message_id, announcement.id
                );
                EditOutcome::Edited
            }
            Err(e) => {
                warn!("Failed to edit announcement {}: {e}", announcement.id);
                EditOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ChannelId, MessageId, MockChatPlatform, PlatformError, RoleId};
    use crate::testing::{announcer, mock_platform_ready, role, sent, GUILD_ID, ROLE_ID, TRIGGER};

    fn edit(content: &str) -> MessageEdit {
        MessageEdit {
            guild_id: GUILD_ID,
            message_id: MessageId(TRIGGER),
            content: content.to_string(),
            author: announcer(),
        }
    }

    #[tokio::test]
    async fn test_untracked_edit_is_noop() {
        let platform = MockChatPlatform::new();
        let workflow = AnnounceWorkflow::new(5);
        let outcome = workflow.handle_update(&platform, &edit("vip | new")).await;
        assert_eq!(outcome, EditOutcome::NotTracked);
    }

    #[tokio::test]
    async fn test_tracked_edit_rerenders_last_field() {
        let mut platform = mock_platform_ready(vec![role(ROLE_ID, "vip", false)]);
        platform
            .expect_edit_message()
            .withf(|message, text| {
                message.id == MessageId(77)
                    && text == "<@&42> corrected time\n\n*Announced by Alice*"
            })
            .times(1)
            .returning(|message, _| Ok(message.clone()));

        let workflow = AnnounceWorkflow::new(5);
        workflow
            .cache()
            .put(
                MessageId(TRIGGER),
                sent(ChannelId(555), 77, vec![RoleId(ROLE_ID)]),
            )
            .await;

        let outcome = workflow
            .handle_update(&platform, &edit("!announce vip | <#555> | corrected time"))
            .await;
        assert_eq!(outcome, EditOutcome::Edited);
    }

    #[tokio::test]
    async fn test_missing_role_mention_skips() {
        let platform = MockChatPlatform::new();
        let workflow = AnnounceWorkflow::new(5);
        workflow
            .cache()
            .put(MessageId(TRIGGER), sent(ChannelId(555), 77, vec![]))
            .await;

        let outcome = workflow.handle_update(&platform, &edit("vip | x")).await;
        assert_eq!(outcome, EditOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_edit_failure_reported() {
        let mut platform = mock_platform_ready(vec![role(ROLE_ID, "vip", true)]);
        platform
            .expect_edit_message()
            .times(1)
            .returning(|_, _| Err(PlatformError::NotFound("message".into())));

        let workflow = AnnounceWorkflow::new(5);
        workflow
            .cache()
            .put(
                MessageId(TRIGGER),
                sent(ChannelId(555), 77, vec![RoleId(ROLE_ID)]),
            )
            .await;

        let outcome = workflow.handle_update(&platform, &edit("vip | x")).await;
        assert_eq!(outcome, EditOutcome::Failed);
    }
}
