use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use page_mirror::{MirrorCommand, PageMirror};

#[tokio::main]
async fn main() -> Result<()> {
    let args = MirrorCommand::parse();

    // RUST_LOG wins over -q/-v
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    debug!(?args, "CLI arguments parsed");

    let mirror = PageMirror::new(args.options())?;

    let progress_bar = if args.show_progress() {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
        bar.set_message(format!("Mirroring {}", args.url));
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    } else {
        ProgressBar::hidden()
    };

    let outcome = mirror.mirror(&args.url).await;
    progress_bar.finish_and_clear();
    let result = outcome?;

    for warning in &result.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
    for failed in result.failed_assets() {
        if let Err(e) = &failed.result {
            eprintln!("{} {}", "warning:".yellow().bold(), e);
        }
    }

    println!("{}", result.html_path.display());
    Ok(())
}
