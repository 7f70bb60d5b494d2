use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "vidscan: keyword search over video datasets", long_about = None)]
pub struct Cli {
    /// JSON config file (dataset path/url, batch sizes, export dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Dataset CSV path; overrides the config file
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,

    /// Log progress and per-operation summaries
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct Keywords {
    /// Comma-separated keywords; a name matching any of them is a hit
    pub keywords: String,

    /// Comma-separated keywords; a name matching any of them is dropped
    #[arg(long, short = 'x', default_value = "")]
    pub exclude: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the dataset if it is not already present
    Download {
        /// Source URL (defaults to the configured dataset URL)
        #[arg(long)]
        url: Option<String>,
    },

    /// Print one page (50 rows) of matches
    Search {
        #[command(flatten)]
        keywords: Keywords,

        /// Zero-based page number
        #[arg(long, default_value_t = 0)]
        page: usize,
    },

    /// Count every match in the dataset
    Count {
        #[command(flatten)]
        keywords: Keywords,
    },

    /// Write every match to a CSV file
    Export {
        #[command(flatten)]
        keywords: Keywords,

        /// Output file name; `.csv` is appended if missing
        #[arg(long, default_value = "results")]
        out: PathBuf,
    },
}
