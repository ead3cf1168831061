use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{Context as _, Result};
use grind_counter::{
    models::BotConfig,
    processing::{run_weekly, WeeklyTally},
    utils::{config_path, load_config},
};
use serenity::{
    all::{Context, EventHandler, GatewayIntents, Ready},
    async_trait, Client,
};
use tokio::signal::ctrl_c;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct Handler {
    config: Arc<BotConfig>,
    scheduler_started: AtomicBool,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Logged in as {}", ready.user.name);

        // Reconnects fire `ready` again; only the first one starts the timer.
        if self.scheduler_started.swap(true, Ordering::SeqCst) {
            return;
        }
        let job = Arc::new(WeeklyTally::new(Arc::clone(&ctx.http), Arc::clone(&self.config)));
        tokio::spawn(run_weekly(job));
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let path = config_path();
    let config = Arc::new(load_config(&path)?);
    info!(
        path = %path.display(),
        channel = %config.channel,
        dm = config.user.is_some(),
        dry_run = config.dry_run,
        "🔑 config loaded"
    );

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.token, intents)
        .event_handler(Handler {
            config: Arc::clone(&config),
            scheduler_started: AtomicBool::new(false),
        })
        .await
        .context("building Discord client")?;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        if let Ok(()) = ctrl_c().await {
            warn!("⚠️ Received Ctrl+C, shutting down...");
            shard_manager.shutdown_all().await;
        }
    });

    client.start().await.context("Discord client stopped")?;
    Ok(())
}
