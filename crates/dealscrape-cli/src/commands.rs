//! Command handlers for the CLI.
//!
//! Scraper failures are soft: an unknown URL or a failed scrape prints a
//! short notice instead of exiting with an error.

use std::time::Duration;

use dealscrape_scraper::{FetchOptions, FetchPipeline, Header, Scraper, TargetRegistry};
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over the configured level; `--verbose` wins over both.
pub(crate) fn env_filter(log_level: &str, verbose: bool) -> anyhow::Result<EnvFilter> {
    if verbose {
        return Ok(EnvFilter::try_new("debug")?);
    }
    Ok(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?)
}

/// One line per target: `site [locale] category`, then the pattern count.
pub(crate) fn render_targets(registry: &TargetRegistry) -> String {
    let mut out = String::new();
    for target in registry.all() {
        let patterns = target.patterns().len();
        let state = if target.is_enabled() { "" } else { " (disabled)" };
        out.push_str(&format!(
            "{}  parser={} patterns={patterns}{state}\n",
            target.label(),
            target.parser_id()
        ));
    }
    out
}

/// The scraper's defaults with any command-line overrides applied.
pub(crate) fn fetch_options(
    defaults: &FetchOptions,
    headers: Vec<Header>,
    proxy: Option<String>,
    timeout_secs: Option<u64>,
) -> FetchOptions {
    FetchOptions {
        headers,
        proxy: proxy.or_else(|| defaults.proxy.clone()),
        timeout: timeout_secs.map_or(defaults.timeout, Duration::from_secs),
    }
}

pub(crate) fn run_resolve(scraper: &mut Scraper, url: &str) -> anyhow::Result<()> {
    match scraper.resolve_url(url) {
        Some(context) => println!("{}", serde_json::to_string_pretty(&context)?),
        None => println!("no target matches {url}"),
    }
    Ok(())
}

pub(crate) async fn run_fetch(url: &str, options: &FetchOptions) -> anyhow::Result<()> {
    let pipeline = FetchPipeline::new()?;
    let outcome = pipeline.fetch(url, options).await;
    println!("{outcome}");
    Ok(())
}

pub(crate) async fn run_deals(scraper: &mut Scraper, url: &str) -> anyhow::Result<()> {
    let deals = scraper.list_deals(url).await;
    tracing::info!(url, count = deals.len(), "deals listed");
    println!("{}", serde_json::to_string_pretty(&deals)?);
    Ok(())
}

pub(crate) async fn run_deal(scraper: &mut Scraper, url: &str) -> anyhow::Result<()> {
    match scraper.get_deal(url).await {
        Some(detail) => println!("{}", serde_json::to_string_pretty(&detail)?),
        None => println!("no deal detail for {url}"),
    }
    Ok(())
}
