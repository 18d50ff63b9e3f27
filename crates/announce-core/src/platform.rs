//! Chat platform collaborator interface
//!
//! The workflow never talks to a chat service directly. Everything it needs
//! (posting, editing, flipping the mentionable flag, cached permission
//! lookups) goes through [`ChatPlatform`], so a transport adapter can supply
//! the real thing and tests can supply a fake.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw snowflake value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

snowflake!(
    /// Guild (server) identifier
    GuildId
);
snowflake!(
    /// Text channel identifier
    ChannelId
);
snowflake!(
    /// Role identifier
    RoleId
);
snowflake!(
    /// User identifier
    UserId
);
snowflake!(
    /// Message identifier
    MessageId
);

/// Errors reported by a chat platform adapter
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The HTTP request to the platform failed
    #[error("HTTP error: {0}")]
    Http(String),
    /// The referenced entity does not exist (anymore)
    #[error("Not found: {0}")]
    NotFound(String),
    /// The bot lacks a permission required for the request
    #[error("Missing permission: {0}")]
    MissingPermission(String),
    /// Required platform state (cache, connection) is not available
    #[error("Platform unavailable: {0}")]
    Unavailable(String),
}

/// A guild role as seen by the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// Role id
    pub id: RoleId,
    /// Display name of the role
    pub name: String,
    /// Whether members can ping the role
    pub mentionable: bool,
    /// Hierarchy position (higher is more powerful)
    pub position: u16,
}

impl Role {
    /// Mention markup for this role.
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }
}

/// A guild member issuing or editing a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// User id of the member
    pub user_id: UserId,
    /// Nickname or user name
    pub display_name: String,
    /// Roles held by the member
    pub role_ids: Vec<RoleId>,
    /// Member has administrator or manage-guild rights
    pub is_administrator: bool,
}

/// Handle to a message authored by the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Message id
    pub id: MessageId,
    /// Channel the message lives in
    pub channel_id: ChannelId,
    /// Roles mentioned in the message, in order of appearance
    pub mentioned_roles: Vec<RoleId>,
}

/// Everything the workflow knows about one `announce` invocation
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Guild the command was issued in
    pub guild_id: GuildId,
    /// Channel the command was issued in
    pub source_channel: ChannelId,
    /// Id of the triggering message
    pub message_id: MessageId,
    /// Member who issued the command
    pub author: Member,
    /// Channels mentioned in the triggering message, in order
    pub mentioned_channels: Vec<ChannelId>,
}

/// An edit of a previously posted message
#[derive(Debug, Clone)]
pub struct MessageEdit {
    /// Guild the message belongs to
    pub guild_id: GuildId,
    /// Id of the edited message
    pub message_id: MessageId,
    /// New raw content of the message
    pub content: String,
    /// Member who edited the message
    pub author: Member,
}

/// Interface to the chat platform hosting the bot
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Post a message to a channel
    async fn send_message(&self, channel: ChannelId, text: &str)
        -> Result<SentMessage, PlatformError>;
    /// Replace the content of a bot-authored message
    async fn edit_message(
        &self,
        message: &SentMessage,
        text: &str,
    ) -> Result<SentMessage, PlatformError>;
    /// Set the mentionable flag of a role
    async fn set_role_mentionable(
        &self,
        guild: GuildId,
        role: RoleId,
        mentionable: bool,
    ) -> Result<(), PlatformError>;
    /// Open (or reuse) a direct message channel with a user
    async fn open_private_channel(&self, user: UserId) -> Result<ChannelId, PlatformError>;
    /// Whether the bot may post in a guild channel
    fn can_talk(&self, guild: GuildId, channel: ChannelId) -> bool;
    /// Whether the bot holds the manage-roles capability in a guild
    fn can_manage_roles(&self, guild: GuildId) -> bool;
    /// Whether the bot ranks above a role in the guild hierarchy
    fn can_interact(&self, guild: GuildId, role: &Role) -> bool;
    /// All roles of a guild, highest position first
    fn guild_roles(&self, guild: GuildId) -> Vec<Role>;
    /// Look up a single role
    fn role(&self, guild: GuildId, role: RoleId) -> Option<Role>;
    /// Name of a guild channel
    fn channel_name(&self, guild: GuildId, channel: ChannelId) -> Option<String>;
}
