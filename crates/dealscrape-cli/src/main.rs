mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dealscrape_scraper::{Header, Scraper};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dealscrape")]
#[command(about = "Resolve, fetch and scrape deal site URLs")]
struct Cli {
    /// Targets file; overrides `DEALSCRAPE_TARGETS_PATH`.
    #[arg(long, global = true, value_name = "PATH")]
    targets: Option<PathBuf>,

    /// Log at debug level regardless of `DEALSCRAPE_LOG_LEVEL`.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List configured targets.
    Targets,
    /// Resolve a URL against the targets and print the context as JSON.
    Resolve { url: String },
    /// Fetch and parse a URL, printing a one-line outcome.
    Fetch {
        url: String,
        /// Extra request header, repeatable.
        #[arg(long = "header", value_name = "NAME:VALUE")]
        headers: Vec<Header>,
        /// Proxy address, `host:port`.
        #[arg(long)]
        proxy: Option<String>,
        /// Timeout in seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
    /// List the deals at a feed or index URL as JSON.
    Deals { url: String },
    /// Scrape a single deal page as JSON.
    Deal { url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = dealscrape_core::load_app_config_from_env()?;

    let env_filter = commands::env_filter(&config.log_level, cli.verbose)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let targets_path = cli.targets.unwrap_or_else(|| config.targets_path.clone());
    let targets = dealscrape_core::load_targets(&targets_path)
        .with_context(|| format!("loading targets from {}", targets_path.display()))?;
    let mut scraper = Scraper::from_config(&config, &targets.targets)?;
    tracing::debug!(
        path = %targets_path.display(),
        targets = scraper.targets().len(),
        "targets loaded"
    );

    match cli.command {
        Commands::Targets => print!("{}", commands::render_targets(scraper.targets())),
        Commands::Resolve { url } => commands::run_resolve(&mut scraper, &url)?,
        Commands::Fetch {
            url,
            headers,
            proxy,
            timeout,
        } => {
            let options = commands::fetch_options(scraper.fetch_options(), headers, proxy, timeout);
            commands::run_fetch(&url, &options).await?;
        }
        Commands::Deals { url } => commands::run_deals(&mut scraper, &url).await?,
        Commands::Deal { url } => commands::run_deal(&mut scraper, &url).await?,
    }

    Ok(())
}
