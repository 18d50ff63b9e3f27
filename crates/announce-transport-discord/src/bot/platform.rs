//! `ChatPlatform` over serenity's HTTP client and gateway cache.
//!
//! Capability queries are answered from the cache only. A guild missing from
//! the cache answers every query negatively.

use announce_core::platform::{
    self as domain, ChatPlatform, Member, PlatformError, Role, SentMessage,
};
use async_trait::async_trait;
use serenity::builder::{CreateMessage, EditMessage, EditRole};
use serenity::cache::Cache;
use serenity::client::Context;
use serenity::http::{Http, HttpError};
use serenity::model::channel::Message;
use serenity::model::guild::{Guild, Member as GuildMember, Role as GuildRole};
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};
use serenity::model::permissions::Permissions;
use std::num::NonZeroU64;
use std::sync::Arc;
use tracing::debug;

macro_rules! to_serenity_id {
    ($fn_name:ident, $from:ty, $to:ty) => {
        fn $fn_name(id: $from) -> Result<$to, PlatformError> {
            NonZeroU64::new(id.get())
                .map(|raw| <$to>::new(raw.get()))
                .ok_or_else(|| PlatformError::NotFound(format!("invalid id {id}")))
        }
    };
}

to_serenity_id!(guild_id, domain::GuildId, GuildId);
to_serenity_id!(channel_id, domain::ChannelId, ChannelId);
to_serenity_id!(role_id, domain::RoleId, RoleId);
to_serenity_id!(user_id, domain::UserId, UserId);
to_serenity_id!(message_id, domain::MessageId, MessageId);

/// Discord implementation of [`ChatPlatform`]
#[derive(Clone)]
pub struct SerenityPlatform {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl SerenityPlatform {
    /// Create a platform from an HTTP client and a gateway cache.
    #[must_use]
    pub const fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }

    /// Create a platform sharing the client of an event context.
    #[must_use]
    pub fn from_context(ctx: &Context) -> Self {
        Self::new(ctx.http.clone(), ctx.cache.clone())
    }

    /// Resolve a guild member, preferring the cache over an HTTP fetch.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the guild is not cached or the member
    /// cannot be fetched.
    pub async fn member(
        &self,
        guild: domain::GuildId,
        user: UserId,
    ) -> Result<Member, PlatformError> {
        let guild_key = guild_id(guild)?;
        let cached = self
            .with_guild(guild, |g| g.members.get(&user).map(|m| member_view(g, m)))
            .flatten();
        if let Some(member) = cached {
            return Ok(member);
        }

        debug!("Member {user} of guild {guild} not cached, fetching");
        let fetched = guild_key
            .member(&*self.http, user)
            .await
            .map_err(classify)?;
        self.with_guild(guild, |g| member_view(g, &fetched))
            .ok_or_else(|| PlatformError::Unavailable(format!("guild {guild} not cached")))
    }

    fn with_guild<T>(&self, guild: domain::GuildId, f: impl FnOnce(&Guild) -> T) -> Option<T> {
        let key = guild_id(guild).ok()?;
        let guild = self.cache.guild(key)?;
        Some(f(&guild))
    }

    fn current_user(&self) -> UserId {
        self.cache.current_user().id
    }
}

#[async_trait]
impl ChatPlatform for SerenityPlatform {
    async fn send_message(
        &self,
        channel: domain::ChannelId,
        text: &str,
    ) -> Result<SentMessage, PlatformError> {
        channel_id(channel)?
            .send_message(&*self.http, CreateMessage::new().content(text))
            .await
            .map(|message| sent_message(&message))
            .map_err(classify)
    }

    async fn edit_message(
        &self,
        message: &SentMessage,
        text: &str,
    ) -> Result<SentMessage, PlatformError> {
        channel_id(message.channel_id)?
            .edit_message(
                &*self.http,
                message_id(message.id)?,
                EditMessage::new().content(text),
            )
            .await
            .map(|message| sent_message(&message))
            .map_err(classify)
    }

    async fn set_role_mentionable(
        &self,
        guild: domain::GuildId,
        role: domain::RoleId,
        mentionable: bool,
    ) -> Result<(), PlatformError> {
        guild_id(guild)?
            .edit_role(
                &*self.http,
                role_id(role)?,
                EditRole::new().mentionable(mentionable),
            )
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn open_private_channel(
        &self,
        user: domain::UserId,
    ) -> Result<domain::ChannelId, PlatformError> {
        user_id(user)?
            .create_dm_channel(&*self.http)
            .await
            .map(|channel| domain::ChannelId(channel.id.get()))
            .map_err(classify)
    }

    fn can_talk(&self, guild: domain::GuildId, channel: domain::ChannelId) -> bool {
        let Ok(channel) = channel_id(channel) else {
            return false;
        };
        let me = self.current_user();
        self.with_guild(guild, |g| {
            let (Some(channel), Some(member)) = (g.channels.get(&channel), g.members.get(&me))
            else {
                return false;
            };
            let permissions = g.user_permissions_in(channel, member);
            permissions.view_channel() && permissions.send_messages()
        })
        .unwrap_or(false)
    }

    fn can_manage_roles(&self, guild: domain::GuildId) -> bool {
        let me = self.current_user();
        self.with_guild(guild, |g| {
            g.members
                .get(&me)
                .is_some_and(|member| guild_permissions(g, member).manage_roles())
        })
        .unwrap_or(false)
    }

    fn can_interact(&self, guild: domain::GuildId, role: &Role) -> bool {
        let me = self.current_user();
        self.with_guild(guild, |g| {
            if g.owner_id == me {
                return true;
            }
            g.members.get(&me).is_some_and(|member| {
                let positions = member
                    .roles
                    .iter()
                    .filter_map(|id| g.roles.get(id))
                    .map(|r| r.position);
                outranks(positions, role.position)
            })
        })
        .unwrap_or(false)
    }

    fn guild_roles(&self, guild: domain::GuildId) -> Vec<Role> {
        self.with_guild(guild, |g| {
            sort_by_hierarchy(g.roles.values().map(role_view).collect())
        })
        .unwrap_or_default()
    }

    fn role(&self, guild: domain::GuildId, role: domain::RoleId) -> Option<Role> {
        let key = role_id(role).ok()?;
        self.with_guild(guild, |g| g.roles.get(&key).map(role_view))
            .flatten()
    }

    fn channel_name(&self, guild: domain::GuildId, channel: domain::ChannelId) -> Option<String> {
        let key = channel_id(channel).ok()?;
        self.with_guild(guild, |g| g.channels.get(&key).map(|c| c.name.clone()))
            .flatten()
    }
}

fn sent_message(message: &Message) -> SentMessage {
    SentMessage {
        id: domain::MessageId(message.id.get()),
        channel_id: domain::ChannelId(message.channel_id.get()),
        mentioned_roles: message
            .mention_roles
            .iter()
            .map(|id| domain::RoleId(id.get()))
            .collect(),
    }
}

fn role_view(role: &GuildRole) -> Role {
    Role {
        id: domain::RoleId(role.id.get()),
        name: role.name.clone(),
        mentionable: role.mentionable,
        position: role.position,
    }
}

fn member_view(guild: &Guild, member: &GuildMember) -> Member {
    let permissions = guild_permissions(guild, member);
    Member {
        user_id: domain::UserId(member.user.id.get()),
        display_name: member.display_name().to_string(),
        role_ids: member.roles.iter().map(|id| domain::RoleId(id.get())).collect(),
        is_administrator: permissions.administrator() || permissions.manage_guild(),
    }
}

fn guild_permissions(guild: &Guild, member: &GuildMember) -> Permissions {
    let everyone = guild
        .roles
        .get(&RoleId::new(guild.id.get()))
        .map_or_else(Permissions::empty, |role| role.permissions);
    combine_permissions(
        guild.owner_id == member.user.id,
        everyone,
        member
            .roles
            .iter()
            .filter_map(|id| guild.roles.get(id))
            .map(|role| role.permissions),
    )
}

/// Guild-level permissions: the owner and administrators hold everything.
fn combine_permissions(
    is_owner: bool,
    everyone: Permissions,
    roles: impl IntoIterator<Item = Permissions>,
) -> Permissions {
    if is_owner {
        return Permissions::all();
    }
    let combined = roles.into_iter().fold(everyone, |acc, p| acc | p);
    if combined.contains(Permissions::ADMINISTRATOR) {
        Permissions::all()
    } else {
        combined
    }
}

/// Whether the highest of `positions` is above `target`.
fn outranks(positions: impl IntoIterator<Item = u16>, target: u16) -> bool {
    positions.into_iter().max().is_some_and(|top| top > target)
}

/// Highest position first; ties broken by id like the client does.
fn sort_by_hierarchy(mut roles: Vec<Role>) -> Vec<Role> {
    roles.sort_by(|a, b| b.position.cmp(&a.position).then(a.id.cmp(&b.id)));
    roles
}

fn classify(err: serenity::Error) -> PlatformError {
    match &err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            match response.status_code.as_u16() {
                403 => PlatformError::MissingPermission(err.to_string()),
                404 => PlatformError::NotFound(err.to_string()),
                _ => PlatformError::Http(err.to_string()),
            }
        }
        serenity::Error::Model(_) => PlatformError::MissingPermission(err.to_string()),
        _ => PlatformError::Http(err.to_string()),
    }
}
