//! One-shot search: print a single keyword's results and exit.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use linkwatch_common::Config;
use linkwatch_watcher::searcher::searcher_from_config;

#[derive(Parser)]
#[command(name = "search", about = "Search one keyword and print the discovered links")]
struct Cli {
    /// Search keyword
    keyword: String,

    /// Number of links to return
    #[arg(short = 'n', long, default_value_t = 10)]
    num: usize,

    /// Print only URLs, one per line
    #[arg(long)]
    links_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let searcher = searcher_from_config(&config)?;
    let hits = searcher.search(&cli.keyword, cli.num).await?;

    if cli.links_only {
        for hit in &hits {
            println!("{}", hit.url);
        }
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!("{}. {}", i + 1, hit.title);
        println!("   {}", hit.url);
        if !hit.snippet.is_empty() {
            let short: String = hit.snippet.chars().take(150).collect();
            println!("   {short}...");
        }
        println!();
    }

    Ok(())
}
