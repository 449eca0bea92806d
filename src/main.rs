//! fxboard command line

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fxboard::config::AppConfig;
use fxboard::notify::{
    notify_all, requested_channels, Channel, ConsoleNotifier, KakaoConfig, KakaoNotifier,
    Notifier, TelegramConfig, TelegramNotifier,
};
use fxboard::oracle::sources::build_http_client;
use fxboard::oracle::{build_service, Clock, SeoulClock};
use fxboard::report::render_report;

#[derive(Parser)]
#[command(name = "fxboard")]
#[command(about = "KRW exchange rate board", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current snapshot as JSON
    Snapshot,

    /// Build the chat report and send it
    Report {
        /// Print the message instead of sending it
        #[arg(long)]
        dry_run: bool,

        /// Send through the Kakao memo channel (default)
        #[arg(long)]
        kakao: bool,

        /// Send through Telegram
        #[arg(long)]
        telegram: bool,

        /// Send through Kakao and Telegram
        #[arg(long)]
        all: bool,
    },

    /// Run the dashboard JSON API
    #[cfg(feature = "dashboard")]
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = AppConfig::load()?;
    tracing::info!(config = %cfg.digest(), "Configuration loaded");

    match cli.command {
        Commands::Snapshot => {
            let service = build_service(&cfg)?;
            let snapshot = service.get_snapshot().await;
            let json = serde_json::to_string_pretty(&snapshot)
                .context("Failed to serialize snapshot")?;
            println!("{}", json);
        }
        Commands::Report {
            dry_run,
            kakao,
            telegram,
            all,
        } => run_report(&cfg, dry_run, requested_channels(kakao, telegram, all)).await?,
        #[cfg(feature = "dashboard")]
        Commands::Serve => {
            let service = std::sync::Arc::new(build_service(&cfg)?);
            fxboard::dashboard::start_server(service, &cfg.dashboard.bind_addr).await?;
        }
    }

    Ok(())
}

async fn run_report(cfg: &AppConfig, dry_run: bool, channels: Vec<Channel>) -> Result<()> {
    let service = build_service(cfg)?;
    let snapshot = service.get_snapshot().await;
    let message = render_report(
        &snapshot,
        SeoulClock.now(),
        cfg.report.detail_url.as_deref(),
    );

    if dry_run {
        ConsoleNotifier.send(&message).await?;
        return Ok(());
    }

    let client = build_http_client(
        Duration::from_secs(cfg.fetch.timeout_secs),
        &cfg.fetch.user_agent,
    )?;

    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();
    for channel in channels {
        let notifier: Result<Box<dyn Notifier>, _> = match channel {
            Channel::Kakao => KakaoConfig::resolve(&cfg.kakao, cfg.report.detail_url.clone())
                .map(|kc| Box::new(KakaoNotifier::new(kc, client.clone())) as Box<dyn Notifier>),
            Channel::Telegram => TelegramConfig::resolve(&cfg.telegram)
                .map(|tg| Box::new(TelegramNotifier::new(tg, client.clone())) as Box<dyn Notifier>),
        };
        match notifier {
            Ok(notifier) => notifiers.push(notifier),
            Err(e) => tracing::error!(channel = ?channel, error = %e, "Channel unavailable"),
        }
    }
    if notifiers.is_empty() {
        tracing::warn!("No chat channel configured, printing the report");
        notifiers.push(Box::new(ConsoleNotifier));
    }

    let delivered = notify_all(&notifiers, &message).await;
    if delivered == 0 {
        bail!("report was not delivered to any channel");
    }
    Ok(())
}
