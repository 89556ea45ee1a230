use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tg_releasebot::config;
use tg_releasebot::dispatch::Dispatcher;
use tg_releasebot::github::GithubClient;
use tg_releasebot::telegram::{self, TelegramSink};

const EVENT_BUFFER: usize = 64;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log every inbound update and outbound decision
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    let cfg = config::load(Some(&args.config))?;

    let bot = Bot::new(cfg.telegram.bot_token.clone());
    telegram::log_bot_identity(&bot, args.debug).await?;

    let webhook = match &cfg.telegram.webhook {
        Some(hook) => Some(webhooks::Options::new(
            hook.listen_addr()?,
            hook.url(&cfg.telegram.bot_token)?,
        )),
        None => None,
    };

    let github = GithubClient::from_config(&cfg)?;
    let dispatcher = Dispatcher::new(Arc::new(github), Arc::new(TelegramSink::new(bot.clone())))
        .with_reply_timeout(cfg.app.reply_timeout());

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let dispatch = tokio::spawn(async move { dispatcher.run(rx).await });

    info!("starting telegram bot");
    if let Err(err) = telegram::listen(bot, tx, webhook).await {
        error!(?err, "telegram listener failed");
        return Err(err);
    }

    // Listener returned (Ctrl-C); the sender is dropped, so the loop drains and exits.
    if let Err(err) = dispatch.await {
        error!(?err, "dispatch loop panicked");
    }
    info!("shut down");
    Ok(())
}
