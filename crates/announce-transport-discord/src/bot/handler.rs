//! Gateway event handler: new messages run `announce`, edits are propagated.

use crate::bot::commands::announce_args;
use crate::bot::platform::SerenityPlatform;
use announce_core::parser::extract_channel_mentions;
use announce_core::platform::{ChannelId, CommandContext, GuildId, MessageEdit, MessageId};
use announce_core::{AnnounceWorkflow, PolicyStore};
use async_trait::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::model::channel::Message;
use serenity::model::event::MessageUpdateEvent;
use serenity::model::gateway::Ready;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Routes Discord events into the announce workflow
pub struct AnnounceHandler {
    workflow: Arc<AnnounceWorkflow>,
    policies: Arc<PolicyStore>,
    prefix: String,
}

impl AnnounceHandler {
    /// Create a handler recognising commands that start with `prefix`.
    #[must_use]
    pub fn new(
        workflow: Arc<AnnounceWorkflow>,
        policies: Arc<PolicyStore>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            workflow,
            policies,
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl EventHandler for AnnounceHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            "Connected as {} to {} guild(s)",
            ready.user.name,
            ready.guilds.len()
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(guild) = msg.guild_id else {
            return;
        };
        let Some(args) = announce_args(&msg.content, &self.prefix) else {
            return;
        };

        let guild = GuildId(guild.get());
        let platform = SerenityPlatform::from_context(&ctx);
        let author = match platform.member(guild, msg.author.id).await {
            Ok(member) => member,
            Err(e) => {
                warn!("Could not resolve author {} in guild {guild}: {e}", msg.author.id);
                return;
            }
        };

        let command = CommandContext {
            guild_id: guild,
            source_channel: ChannelId(msg.channel_id.get()),
            message_id: MessageId(msg.id.get()),
            author,
            mentioned_channels: extract_channel_mentions(&msg.content),
        };
        let outcome = self
            .workflow
            .handle_command(&platform, &command, self.policies.policy_for(guild), args)
            .await;
        debug!(?outcome, "announce handled");
    }

    async fn message_update(
        &self,
        ctx: Context,
        _old_if_available: Option<Message>,
        _new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        let (Some(guild), Some(content), Some(author)) =
            (event.guild_id, event.content, event.author)
        else {
            return;
        };
        let message_id = MessageId(event.id.get());
        if self.workflow.cache().get(&message_id).await.is_none() {
            return;
        }

        let guild = GuildId(guild.get());
        let platform = SerenityPlatform::from_context(&ctx);
        let author = match platform.member(guild, author.id).await {
            Ok(member) => member,
            Err(e) => {
                warn!("Could not resolve editor {} in guild {guild}: {e}", author.id);
                return;
            }
        };

        let edit = MessageEdit {
            guild_id: guild,
            message_id,
            content,
            author,
        };
        let outcome = self.workflow.handle_update(&platform, &edit).await;
        debug!(?outcome, "edit handled");
    }
}
