pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vidscan_core::ScanConfig;
use vidscan_core::error::Result;

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut cfg = ScanConfig::load_or_default(cli.config.as_deref())?;
    if let Some(dataset) = cli.dataset {
        cfg.dataset_path = dataset;
    }

    match cli.command {
        Commands::Download { url } => handlers::handle_download(&cfg, url),
        Commands::Search { keywords, page } => handlers::handle_search(&cfg, keywords, page),
        Commands::Count { keywords } => handlers::handle_count(&cfg, keywords),
        Commands::Export { keywords, out } => handlers::handle_export(&cfg, keywords, out),
    }
}
