//! Announcement text rendering

use crate::platform::{Member, Role};

/// Produces the text of an announcement
pub trait AnnouncementRenderer: Send + Sync {
    /// Render the announcement of `body` to `role` on behalf of `announcer`.
    fn render(&self, role: &Role, body: &str, announcer: &Member) -> String;
}

/// Default renderer: role mention, body, and an attribution line
#[derive(Debug, Clone, Copy, Default)]
pub struct MentionRenderer;

impl AnnouncementRenderer for MentionRenderer {
    fn render(&self, role: &Role, body: &str, announcer: &Member) -> String {
        format!(
            "{} {}\n\n*Announced by {}*",
            role.mention(),
            body,
            announcer.display_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{RoleId, UserId};
    use insta::assert_snapshot;

    #[test]
    fn test_mention_renderer_snapshot() {
        let role = Role {
            id: RoleId(42),
            name: "raiders".to_string(),
            mentionable: true,
            position: 4,
        };
        let announcer = Member {
            user_id: UserId(7),
            display_name: "Alice".to_string(),
            role_ids: vec![],
            is_administrator: false,
        };

        assert_snapshot!(MentionRenderer.render(&role, "Raid starts at 20:00", &announcer), @r"
        <@&42> Raid starts at 20:00

        *Announced by Alice*
        ");
    }
}
