//! Election Trends reporter
//!
//! Reads every committed revision of a results file, aggregates how each race
//! has trended, and writes the report as text, HTML and JSON.

mod config;
mod output;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trend_history::load_history;
use trend_services::{render_text, RaceTracker};

use crate::config::{Args, TrendConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Logs go to stderr so the text report can be piped
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,trend_cli=debug")),
        )
        .init();

    let config = TrendConfig::from_args(Args::parse())?;
    let source = config.source.build()?;
    info!("Reading history from {}", source.name());

    let history = load_history(source.as_ref(), &config.load_options()).await?;
    if history.is_empty() {
        anyhow::bail!("No usable revisions found in {}", source.name());
    }

    let report = RaceTracker::new(&history).track(&config.races);
    let failed = report.races.iter().filter(|r| r.is_failed()).count();
    info!(
        "Tracked {} races ({} failed)",
        report.races.len(),
        failed
    );

    output::write_reports(&report, &config.out_dir, &config.formats).await?;
    print!("{}", render_text(&report));

    Ok(())
}
