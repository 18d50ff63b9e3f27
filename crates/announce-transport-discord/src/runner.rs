use crate::bot::AnnounceHandler;
use crate::config::BotSettings;
use announce_core::{AnnounceWorkflow, PolicyStore};
use anyhow::Context as _;
use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use std::sync::Arc;
use tracing::{error, info};

/// Run the Discord transport runtime until the gateway stops or Ctrl-C.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the gateway fails.
pub async fn run_bot(settings: Arc<BotSettings>) -> anyhow::Result<()> {
    let workflow = init_workflow(&settings);
    let policies = init_policies(&settings);
    let handler = AnnounceHandler::new(workflow, policies, settings.discord.prefix());

    let mut client = Client::builder(&settings.discord.discord_token, gateway_intents())
        .event_handler(handler)
        .await
        .context("Failed to build Discord client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        info!("Shutting down...");
        shard_manager.shutdown_all().await;
    });

    info!("Bot is running...");

    client
        .start()
        .await
        .context("Discord gateway connection failed")
}

/// Guild events, message content and the member list are all needed.
fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS
}

fn init_workflow(settings: &BotSettings) -> Arc<AnnounceWorkflow> {
    let capacity = settings.core.effective_cache_capacity();
    info!("Initializing AnnounceWorkflow (cache capacity: {})", capacity);
    Arc::new(AnnounceWorkflow::new(capacity))
}

fn init_policies(settings: &BotSettings) -> Arc<PolicyStore> {
    let store = settings.core.policy_store();
    info!("Loaded announce policies for {} guild(s)", store.len());
    Arc::new(store)
}
