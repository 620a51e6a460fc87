//! Bougbot CLI entry point.

use anyhow::Context as _;
use clap::Parser;
use std::sync::Arc;

use bougbot::config::Config;
use bougbot::llm::LlmBridge;
use bougbot::messaging::DiscordHandler;
use bougbot::messaging::discord::gateway_intents;

#[derive(Parser)]
#[command(name = "bougbot")]
#[command(about = "Discord bot that answers mentions and tells stories with a local Ollama model")]
struct Cli {
    /// Path to config file (optional)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine; the variables may already be exported.
    let dotenv_path = dotenvy::dotenv().ok();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            let _guard = bougbot::logging::init_tracing(cli.debug, None);
            tracing::error!(%error, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let _guard = bougbot::logging::init_tracing(cli.debug, config.logging.dir.as_deref());

    tracing::info!("Starting Bougbot...");
    if let Some(path) = dotenv_path {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }
    tracing::info!(
        model = %config.llm.model,
        endpoint = %config.llm.endpoint().url,
        guild_id = ?config.discord.guild_id,
        "Configuration loaded"
    );

    let bridge = Arc::new(LlmBridge::new(config.llm.clone()));
    let handler = DiscordHandler::new(bridge, config.discord.guild_id);

    let mut client = serenity::Client::builder(&config.discord.token, gateway_intents())
        .event_handler(handler)
        .await
        .with_context(|| "failed to create Discord client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to listen for shutdown signal");
            return;
        }
        tracing::info!("Shutdown signal received");
        shard_manager.shutdown_all().await;
    });

    tracing::info!("Starting Discord gateway connection...");
    client
        .start()
        .await
        .with_context(|| "Discord client error")?;

    tracing::info!("Bougbot stopped");
    Ok(())
}
