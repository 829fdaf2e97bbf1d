pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pagefeed")]
#[command(about = "Turn a dynamic web page into an RSS/Atom feed", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the source page and write the feed
    Generate {
        /// Output path (overrides the configured one)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render the source page and print the extracted items as JSON
    Extract,
    /// Build a feed from a saved HTML page (e.g. a diagnostics dump)
    Convert {
        /// HTML file to read
        #[arg(short, long)]
        input: PathBuf,

        /// URL the page was captured from, for resolving relative links
        #[arg(short, long)]
        base_url: Option<String>,

        /// Output path (overrides the configured one)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Regenerate the feed periodically
    Watch {
        /// Update interval (e.g., "1h", "30m", "6h", "1d")
        #[arg(short, long, default_value = "1h")]
        interval: String,

        /// Skip the initial run on start
        #[arg(long)]
        no_initial_run: bool,
    },
    /// Show the effective configuration
    Config,
}
