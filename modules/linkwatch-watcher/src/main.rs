use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkwatch_common::{Config, WatchConfig};
use linkwatch_watcher::watcher::Watcher;

#[derive(Parser)]
#[command(name = "linkwatch", about = "Search configured keywords and notify new URLs")]
struct Cli {
    /// Path to the keyword config JSON file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("Linkwatch starting...");

    let config = Config::from_env();
    config.log_redacted();

    let watch = WatchConfig::load(&cli.config)?;
    if watch.keywords.is_empty() {
        info!("No keywords configured, nothing to do");
        return Ok(());
    }

    let watcher = Watcher::from_config(&config)?;
    let stats = watcher
        .run(&watch.keywords, watch.results_per_keyword)
        .await?;

    info!("Watch run complete");
    println!("{stats}");

    Ok(())
}
