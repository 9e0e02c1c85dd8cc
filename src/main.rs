//! Country brief, binary entrypoint.
//! One run: fetch feeds, build the brief, write artifacts, exit.
//! Scheduling (cron, CI) lives outside this process.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use country_brief::config::feeds::{load_feeds, DEFAULT_FEEDS_PATH};
use country_brief::config::BriefConfig;
use country_brief::ingest::article::HttpArticleFetcher;
use country_brief::ingest::feed::{http_client, FeedProvider};
use country_brief::ingest::types::FeedSource;
use country_brief::ingest::{fetch_all, fetch_articles};
use country_brief::metrics::Metrics;
use country_brief::snapshot::{RunSnapshot, DEFAULT_SNAPSHOT_PATH};
use country_brief::{assemble, output, shortlist};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Brief config (TOML). Falls back to BRIEF_CONFIG_PATH, then config/brief.toml
    #[arg(short, long, env = "BRIEF_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Feed list, one URL (or `Label - URL`) per line
    #[arg(short, long, env = "BRIEF_FEEDS_PATH", default_value = DEFAULT_FEEDS_PATH)]
    feeds: PathBuf,

    /// Output directory for index.md, latest.json, last_run.json and latest.csv
    #[arg(short, long, env = "BRIEF_OUT_DIR", default_value = "docs/data")]
    out_dir: PathBuf,

    /// Previous-run snapshot, read for the diff and overwritten at the end
    #[arg(long, env = "BRIEF_SNAPSHOT_PATH", default_value = DEFAULT_SNAPSHOT_PATH)]
    snapshot: PathBuf,

    /// Fetch article pages for the shortlist to improve summaries
    #[arg(long, env = "BRIEF_FETCH_ARTICLES")]
    fetch_articles: bool,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "BRIEF_HTTP_TIMEOUT_SECS", default_value_t = 20)]
    timeout_secs: u64,

    /// Fixed "now" (RFC 3339) for reproducible runs
    #[arg(long, env = "BRIEF_NOW")]
    now: Option<String>,

    /// Write a Prometheus text dump of run metrics here
    #[arg(long, env = "BRIEF_METRICS_FILE")]
    metrics_file: Option<PathBuf>,
}

/// `RUST_LOG` filter (default `info`); `LOG_FORMAT=json` for JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

fn parse_now(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|d| d.with_timezone(&Utc))
            .with_context(|| format!("--now is not RFC 3339: {s}")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let metrics = match &cli.metrics_file {
        Some(_) => Some(Metrics::init()?),
        None => None,
    };

    let cfg = match &cli.config {
        Some(path) => BriefConfig::from_toml_path(path)?,
        None => BriefConfig::from_toml()?,
    };
    let now = parse_now(cli.now.as_deref())?;

    let client = http_client(Duration::from_secs(cli.timeout_secs))?;
    let feeds = load_feeds(&cli.feeds)?;
    tracing::info!(target: "main", country = %cfg.country.name, feeds = feeds.len(), "run started");

    let providers: Vec<Box<dyn FeedSource>> = feeds
        .iter()
        .map(|f| Box::new(FeedProvider::from_spec(f, client.clone())) as Box<dyn FeedSource>)
        .collect();
    let fetched = fetch_all(&providers).await;

    let mut list = shortlist(fetched.entries, &cfg, now);
    list.stats.provider_errors = fetched.provider_errors;

    let articles = if cli.fetch_articles {
        let fetcher = HttpArticleFetcher::new(client.clone());
        let entries: Vec<_> = list.selected.iter().map(|c| c.entry().clone()).collect();
        fetch_articles(&fetcher, &entries).await
    } else {
        Default::default()
    };

    let previous = RunSnapshot::load(&cli.snapshot);
    let (brief, snapshot) = assemble(list, &articles, &previous, &cfg, now);
    let written = output::write_all(&brief, &snapshot, &cli.out_dir, &cli.snapshot).await?;

    if let (Some(m), Some(path)) = (&metrics, &cli.metrics_file) {
        m.write_to(path).await?;
    }

    tracing::info!(
        target: "main",
        selected = brief.items.len(),
        files_written = written.len(),
        new = brief.diff.new,
        dropped = brief.diff.dropped,
        "run finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["country-brief"]);
        assert_eq!(cli.feeds, PathBuf::from("feeds.txt"));
        assert_eq!(cli.out_dir, PathBuf::from("docs/data"));
        assert!(!cli.fetch_articles);
        assert_eq!(cli.timeout_secs, 20);
    }

    #[test]
    fn now_override_parses() {
        let t = parse_now(Some("2026-03-01T06:00:00Z")).unwrap();
        assert_eq!(t.to_rfc3339(), "2026-03-01T06:00:00+00:00");
        assert!(parse_now(Some("yesterday")).is_err());
    }
}
