use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::fetcher::DEFAULT_USER_AGENT;
use crate::mirror::MirrorOptions;

#[derive(Parser, Debug)]
#[command(
    name = "page-mirror",
    about = "Downloads a web page with its local stylesheets, scripts and images",
    version,
    long_about = "Downloads a single web page and the stylesheets, scripts and images it loads from the same host. Asset references are rewritten to point at the local copies so the page can be browsed offline."
)]
pub struct MirrorCommand {
    /// The URL of the page to mirror
    #[arg(required = true)]
    pub url: String,

    /// Output directory for the page and its assets
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Maximum concurrent asset downloads
    #[arg(
        short = 'c',
        long,
        default_value = "8",
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub max_concurrent: u16,

    /// User agent string to use for requests
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Timeout for each request in seconds
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Hide the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

impl MirrorCommand {
    pub fn options(&self) -> MirrorOptions {
        MirrorOptions {
            output_dir: self.output.clone(),
            max_concurrent: usize::from(self.max_concurrent),
            timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone(),
        }
    }

    /// Default tracing filter when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.no_progress
    }
}
