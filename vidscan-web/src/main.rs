use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vidscan_core::ScanConfig;
use vidscan_web::AppState;

#[derive(Parser)]
#[command(author, version, about = "vidscan web UI", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dataset CSV path; overrides the config file
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Directory exports are written to; overrides the config file
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let args = Args::parse();
    let mut cfg = ScanConfig::load_or_default(args.config.as_deref())?;
    if let Some(dataset) = args.dataset {
        cfg.dataset_path = dataset;
    }
    if let Some(dir) = args.export_dir {
        cfg.export_dir = dir;
    }

    info!(
        dataset = %cfg.dataset_path.display(),
        export_dir = %cfg.export_dir.display(),
        "config loaded"
    );

    let app = vidscan_web::app(AppState::new(cfg));
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!(addr = %args.bind, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
