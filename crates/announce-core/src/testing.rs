//! Testing helpers and mock utilities.
//!
//! Provides fixtures for guild state and a pre-configured mocked platform.

use crate::platform::{
    ChannelId, CommandContext, GuildId, Member, MessageId, MockChatPlatform, Role, RoleId,
    SentMessage, UserId,
};

/// Guild every fixture lives in
pub const GUILD_ID: GuildId = GuildId(100);
/// Channel the fixture command is issued in
pub const SOURCE: u64 = 200;
/// Id of the fixture trigger message
pub const TRIGGER: u64 = 300;
/// Id of the fixture announcement role
pub const ROLE_ID: u64 = 42;

/// Member holding the announcer role `1`.
#[must_use]
pub fn announcer() -> Member {
    Member {
        user_id: UserId(7),
        display_name: "Alice".to_string(),
        role_ids: vec![RoleId(1)],
        is_administrator: false,
    }
}

/// Role fixture at position 1.
#[must_use]
pub fn role(id: u64, name: &str, mentionable: bool) -> Role {
    Role {
        id: RoleId(id),
        name: name.to_string(),
        mentionable,
        position: 1,
    }
}

/// Command issued by [`announcer`] in [`SOURCE`].
#[must_use]
pub fn context(mentioned_channels: Vec<ChannelId>) -> CommandContext {
    CommandContext {
        guild_id: GUILD_ID,
        source_channel: ChannelId(SOURCE),
        message_id: MessageId(TRIGGER),
        author: announcer(),
        mentioned_channels,
    }
}

/// Handle of a bot message.
#[must_use]
pub fn sent(channel: ChannelId, id: u64, mentioned_roles: Vec<RoleId>) -> SentMessage {
    SentMessage {
        id: MessageId(id),
        channel_id: channel,
        mentioned_roles,
    }
}

/// Create a mock platform where every permission check before role
/// interaction passes.
///
/// # Returns
///
/// A `MockChatPlatform` where:
/// - `can_talk` and `can_manage_roles` return `true`
/// - `guild_roles` returns `roles`
/// - `role` looks up `roles` by id
///
/// `can_interact` and all async calls are left to the test.
#[must_use]
pub fn mock_platform_ready(roles: Vec<Role>) -> MockChatPlatform {
    let mut mock = MockChatPlatform::new();
    mock.expect_can_talk().return_const(true);
    mock.expect_can_manage_roles().return_const(true);
    let lookup = roles.clone();
    mock.expect_guild_roles().return_const(roles);
    mock.expect_role()
        .returning(move |_, id| lookup.iter().find(|role| role.id == id).cloned());
    mock
}
