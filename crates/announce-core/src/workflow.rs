//! The `announce` command workflow
//!
//! Checks permissions, parses arguments, resolves the target role and runs
//! the send sequence. When the role is not mentionable the sequence flips the
//! flag on, posts, and always flips it back off once the post resolved,
//! whether it succeeded or not.

use crate::cache::CorrelationCache;
use crate::composer::{AnnouncementRenderer, MentionRenderer};
use crate::error::AnnounceError;
use crate::parser::{parse_announce_args, Target};
use crate::platform::{
    ChannelId, ChatPlatform, CommandContext, GuildId, Member, MessageId, PlatformError, Role,
    SentMessage, UserId,
};
use crate::policy::AnnouncerPolicy;
use crate::resolver::{resolve_single, RoleResolution};
use tracing::{debug, info, instrument, warn};

/// Acknowledgement posted in the source channel after a cross-channel announcement.
pub const SUCCESS_ACK: &str = "Successfully announced";

/// How an `announce` invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The author is not an announcer; nothing was said
    Ignored,
    /// A precondition failed and was reported
    Rejected(AnnounceError),
    /// The announcement was posted and cached
    Announced {
        /// Handle of the posted announcement
        message: SentMessage,
        /// Whether the mentionable flag was flipped for the post
        toggled: bool,
    },
    /// Posting the announcement failed
    SendFailed {
        /// Whether the mentionable flag was flipped (and reverted)
        toggled: bool,
    },
    /// Making the role mentionable failed; nothing was posted
    ToggleFailed,
}

/// Everything the send sequence needs once all checks passed
struct SendPlan<'a> {
    guild: GuildId,
    trigger: MessageId,
    role: Role,
    target: ChannelId,
    text: String,
    author: &'a Member,
}

/// Steps of the send sequence.
///
/// `Reverting` is entered exactly when `Toggling` succeeded, and only after
/// `Sending` resolved.
enum SendPhase {
    Idle,
    Toggling,
    Sending { toggled: bool },
    Reverting(Result<SentMessage, PlatformError>),
    Done(CommandOutcome),
}

/// Runs `announce` commands and propagates edits of their trigger messages
#[derive(Debug)]
pub struct AnnounceWorkflow<R = MentionRenderer> {
    pub(crate) cache: CorrelationCache<MessageId, SentMessage>,
    pub(crate) renderer: R,
}

impl AnnounceWorkflow<MentionRenderer> {
    /// Create a workflow with the default renderer.
    #[must_use]
    pub fn new(cache_capacity: usize) -> Self {
        Self::with_renderer(cache_capacity, MentionRenderer)
    }
}

impl<R: AnnouncementRenderer> AnnounceWorkflow<R> {
    /// Create a workflow with a custom renderer.
    #[must_use]
    pub fn with_renderer(cache_capacity: usize, renderer: R) -> Self {
        Self {
            cache: CorrelationCache::new(cache_capacity),
            renderer,
        }
    }

    /// Trigger-message to announcement correlations.
    #[must_use]
    pub const fn cache(&self) -> &CorrelationCache<MessageId, SentMessage> {
        &self.cache
    }

    /// Handle one `announce` invocation with argument string `args`.
    #[instrument(skip_all, fields(guild = %ctx.guild_id, trigger = %ctx.message_id))]
    pub async fn handle_command<P>(
        &self,
        platform: &P,
        ctx: &CommandContext,
        policy: &dyn AnnouncerPolicy,
        args: &str,
    ) -> CommandOutcome
    where
        P: ChatPlatform + ?Sized,
    {
        // Unauthorized members get no hint that the command exists.
        if !policy.is_announcer(&ctx.author) {
            debug!("User {} is not an announcer", ctx.author.user_id);
            return CommandOutcome::Ignored;
        }

        if !platform.can_talk(ctx.guild_id, ctx.source_channel) {
            let channel_name = platform
                .channel_name(ctx.guild_id, ctx.source_channel)
                .unwrap_or_else(|| ctx.source_channel.to_string());
            let err = AnnounceError::SourceUnpostable(channel_name);
            notify_privately(platform, ctx.author.user_id, &err.to_string()).await;
            return CommandOutcome::Rejected(err);
        }

        let plan = match self.prepare(platform, ctx, policy, args) {
            Ok(plan) => plan,
            Err(err) => {
                reply(platform, ctx.source_channel, &err.to_string()).await;
                return CommandOutcome::Rejected(err);
            }
        };

        let outcome = self.run_send_sequence(platform, &plan).await;

        if let CommandOutcome::Announced { toggled, .. } = &outcome {
            info!(
                "User {} announced to role {} in channel {} (toggled: {})",
                plan.author.user_id, plan.role.id, plan.target, toggled
            );
            if plan.target != ctx.source_channel {
                reply(platform, ctx.source_channel, SUCCESS_ACK).await;
            }
        }

        outcome
    }

    /// Run the checks after the source channel is known to be postable.
    fn prepare<'a, P>(
        &self,
        platform: &P,
        ctx: &'a CommandContext,
        policy: &dyn AnnouncerPolicy,
        args: &str,
    ) -> Result<SendPlan<'a>, AnnounceError>
    where
        P: ChatPlatform + ?Sized,
    {
        if !platform.can_manage_roles(ctx.guild_id) {
            return Err(AnnounceError::MissingManageRoles);
        }

        let args = parse_announce_args(args)?;

        let target = match args.target {
            Target::Source => ctx.source_channel,
            Target::Mentioned => *ctx
                .mentioned_channels
                .first()
                .ok_or(AnnounceError::MissingChannelMention)?,
        };

        if !platform.can_talk(ctx.guild_id, target) {
            return Err(AnnounceError::TargetUnpostable);
        }

        let roles = platform.guild_roles(ctx.guild_id);
        let role = match resolve_single(&roles, &args.role_name, |role| {
            policy.is_announcement_role(role)
        }) {
            RoleResolution::Found(role) => role,
            RoleResolution::NotFound => return Err(AnnounceError::RoleNotFound(args.role_name)),
            RoleResolution::Ambiguous(count) => {
                debug!("{count} announcement roles named {:?}", args.role_name);
                return Err(AnnounceError::RoleAmbiguous);
            }
        };

        if !platform.can_interact(ctx.guild_id, &role) {
            return Err(AnnounceError::RoleUninteractable);
        }

        let text = self.renderer.render(&role, &args.body, &ctx.author);

        Ok(SendPlan {
            guild: ctx.guild_id,
            trigger: ctx.message_id,
            role,
            target,
            text,
            author: &ctx.author,
        })
    }

    async fn run_send_sequence<P>(&self, platform: &P, plan: &SendPlan<'_>) -> CommandOutcome
    where
        P: ChatPlatform + ?Sized,
    {
        let mut phase = SendPhase::Idle;
        loop {
            phase = match phase {
                SendPhase::Idle => {
                    if plan.role.mentionable {
                        SendPhase::Sending { toggled: false }
                    } else {
                        SendPhase::Toggling
                    }
                }
                SendPhase::Toggling => {
                    debug!("Making role {} mentionable", plan.role.id);
                    match platform
                        .set_role_mentionable(plan.guild, plan.role.id, true)
                        .await
                    {
                        Ok(()) => SendPhase::Sending { toggled: true },
                        Err(e) => {
                            warn!("Failed to make role {} mentionable: {e}", plan.role.id);
                            SendPhase::Done(CommandOutcome::ToggleFailed)
                        }
                    }
                }
                SendPhase::Sending { toggled } => {
                    let result = platform.send_message(plan.target, &plan.text).await;
                    match &result {
                        Ok(sent) => self.cache.put(plan.trigger, sent.clone()).await,
                        Err(e) => warn!("Failed to send announcement to {}: {e}", plan.target),
                    }
                    if toggled {
                        SendPhase::Reverting(result)
                    } else {
                        SendPhase::Done(send_outcome(result, false))
                    }
                }
                SendPhase::Reverting(result) => {
                    debug!("Reverting mentionable flag of role {}", plan.role.id);
                    if let Err(e) = platform
                        .set_role_mentionable(plan.guild, plan.role.id, false)
                        .await
                    {
                        warn!(
                            "Failed to reset mentionable flag of role {}: {e}",
                            plan.role.id
                        );
                    }
                    SendPhase::Done(send_outcome(result, true))
                }
                SendPhase::Done(outcome) => return outcome,
            };
        }
    }
}

fn send_outcome(result: Result<SentMessage, PlatformError>, toggled: bool) -> CommandOutcome {
    match result {
        Ok(message) => CommandOutcome::Announced { message, toggled },
        Err(_) => CommandOutcome::SendFailed { toggled },
    }
}

/// Post a reply, logging instead of propagating failures.
pub(crate) async fn reply<P>(platform: &P, channel: ChannelId, text: &str)
where
    P: ChatPlatform + ?Sized,
{
    if let Err(e) = platform.send_message(channel, text).await {
        warn!("Failed to reply in channel {channel}: {e}");
    }
}

/// Best-effort direct message; every failure is swallowed.
async fn notify_privately<P>(platform: &P, user: UserId, text: &str)
where
    P: ChatPlatform + ?Sized,
{
    let channel = match platform.open_private_channel(user).await {
        Ok(channel) => channel,
        Err(e) => {
            debug!("Could not open DM with {user}: {e}");
            return;
        }
    };
    if let Err(e) = platform.send_message(channel, text).await {
        debug!("Could not DM {user}: {e}");
    }
}
