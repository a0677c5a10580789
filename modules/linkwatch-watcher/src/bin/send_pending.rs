//! Deliver queued notifications without running a new search.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use linkwatch_common::Config;
use linkwatch_watcher::notifier::{Notifier, TelegramNotifier};
use linkwatch_watcher::store::NotificationQueue;

#[derive(Parser)]
#[command(
    name = "send-pending",
    about = "Send unsent queue entries to the Telegram group"
)]
struct Cli {
    /// Reset every entry to unsent, then send the whole queue once
    #[arg(long)]
    resend_all: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let queue = NotificationQueue::new(config.queue_file());
    let notifier =
        TelegramNotifier::from_config(&config).map(|n| Box::new(n) as Box<dyn Notifier>);

    let report = if cli.resend_all {
        queue.resend_all(notifier.as_deref()).await?
    } else {
        queue.send_pending(notifier.as_deref()).await?
    };

    println!("{report}");
    Ok(())
}
