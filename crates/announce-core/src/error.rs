//! User-facing errors of the `announce` command
//!
//! Each variant's `Display` output is the exact reply posted to the chat.

use thiserror::Error;

/// Usage line shown for malformed arguments.
pub const USAGE: &str = "Syntax: `announce role_name [ | channel_mention] | text`";

/// Reasons an `announce` invocation stops before anything is sent
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnnounceError {
    /// The bot cannot post in the channel the command came from
    #[error("Can not send messages in channel {0}")]
    SourceUnpostable(String),
    /// The bot lacks the manage-roles capability in the guild
    #[error("Missing MANAGE_ROLES permission!")]
    MissingManageRoles,
    /// Fewer than two pipe-delimited fields were given
    #[error("{}", USAGE)]
    Syntax,
    /// Three fields were given but the message mentions no channel
    #[error("Channel mention missing!")]
    MissingChannelMention,
    /// The bot cannot post in the resolved target channel
    #[error("Can not talk in target channel")]
    TargetUnpostable,
    /// No announceable role matched the requested name
    #[error("No (announcement) roles matching {0} found!")]
    RoleNotFound(String),
    /// More than one announceable role matched the requested name
    #[error("Too many announcement roles with this name!")]
    RoleAmbiguous,
    /// The matched role ranks above the bot
    #[error("Can't interact with this role!")]
    RoleUninteractable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_texts() {
        assert_eq!(
            AnnounceError::SourceUnpostable("general".into()).to_string(),
            "Can not send messages in channel general"
        );
        assert_eq!(
            AnnounceError::Syntax.to_string(),
            "Syntax: `announce role_name [ | channel_mention] | text`"
        );
        assert_eq!(
            AnnounceError::RoleNotFound("vip".into()).to_string(),
            "No (announcement) roles matching vip found!"
        );
        assert_eq!(
            AnnounceError::RoleAmbiguous.to_string(),
            "Too many announcement roles with this name!"
        );
    }
}
