//! # NestBot: knowledge-grounded Q&A bot
//!
//! Answers modding questions in a Discord server using a local language
//! model, grounded in a hand-written knowledge file.
//!
//! Usage:
//!   nestbot                                  # Discord, ~/.nestbot/config.toml
//!   nestbot --config bot.toml                # Custom config
//!   nestbot --cli --knowledge kb.json        # Ask questions from the terminal

use anyhow::{Result, bail};
use clap::Parser;
use nestbot_agent::{Dispatcher, MessageHandler};
use nestbot_channels::{CliChannel, DiscordChannel};
use nestbot_core::config::NestBotConfig;
use nestbot_core::traits::Channel;
use nestbot_knowledge::KnowledgeBase;
use nestbot_providers::InferencePool;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nestbot",
    version,
    about = "🐊 NestBot, knowledge-grounded Q&A bot for Discord"
)]
struct Cli {
    /// Config file (default: ~/.nestbot/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Knowledge file, overrides [knowledge] path
    #[arg(short, long)]
    knowledge: Option<String>,

    /// Read questions from stdin instead of connecting to Discord
    #[arg(long)]
    cli: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "nestbot=debug,nestbot_agent=debug,nestbot_knowledge=debug,nestbot_providers=debug,nestbot_channels=debug"
    } else {
        "nestbot=info,nestbot_agent=info,nestbot_knowledge=info,nestbot_providers=info,nestbot_channels=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => NestBotConfig::load_from(&expand_path(path))?,
        None => NestBotConfig::load()?,
    };

    // Knowledge problems are not fatal: the bot just never finds an answer.
    let knowledge_path = cli.knowledge.as_deref().unwrap_or(&config.knowledge.path);
    let knowledge = Arc::new(KnowledgeBase::load(&expand_path(knowledge_path)));

    // The model, on the other hand, must be reachable before we serve anyone.
    let backend = nestbot_providers::create_backend(&config.brain)?;
    let inference = InferencePool::new(backend, config.brain.workers);
    match inference.health_check().await {
        Ok(true) => tracing::info!(
            "Successfully initialized {} backend at {} ({} worker(s))",
            inference.backend_name(),
            config.brain.endpoint,
            inference.workers()
        ),
        Ok(false) => bail!(
            "Failed to initialize language model: {} is not answering at {}",
            inference.backend_name(),
            config.brain.endpoint
        ),
        Err(e) => bail!("Failed to initialize language model: {e}"),
    }

    let handler = MessageHandler::from_config(&config, knowledge, inference);
    let dispatcher = Dispatcher::new(handler);

    let channel: Arc<dyn Channel> = if cli.cli {
        let mut channel = CliChannel::default();
        channel.connect().await?;
        Arc::new(channel)
    } else {
        if !config.discord.enabled {
            bail!("Discord channel is disabled in config; use --cli for local mode");
        }
        let Some(token) = config.discord.resolve_token() else {
            bail!("No Discord bot token: set [discord] bot_token or DISCORD_TOKEN");
        };
        let mut channel = DiscordChannel::new(token);
        channel.connect().await?;
        Arc::new(channel)
    };

    tracing::info!("Starting bot...");
    dispatcher.run(channel).await?;
    Ok(())
}
