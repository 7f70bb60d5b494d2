use std::io::Write;
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use vidscan_core::error::{Result, VidError};
use vidscan_core::{KeywordExpr, PAGE_SIZE, Page, Provisioned, ScanConfig, Scanner, ensure_dataset};

use crate::presentation::cli::Keywords;

const PROGRESS_TICKS: u64 = 1000;

fn expr_from_args(keywords: &Keywords) -> Result<KeywordExpr> {
    KeywordExpr::parse(&keywords.keywords, &keywords.exclude)
}

fn page_start(page: usize) -> Result<usize> {
    page.checked_mul(PAGE_SIZE)
        .ok_or_else(|| VidError::Config(format!("page {page} is out of range")))
}

fn count_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner} [{bar:40}] {percent:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

pub fn print_page<W: Write>(out: &mut W, page: &Page) -> std::io::Result<()> {
    if page.is_empty() {
        writeln!(out, "No more videos found for the given keyword.")?;
        return Ok(());
    }
    writeln!(out, "Displaying {} videos.", page.len())?;
    for (i, rec) in page.records.iter().enumerate() {
        writeln!(out, "#{:<6} {}", page.start + i, rec.name)?;
        writeln!(out, "        {}", rec.content_url)?;
    }
    Ok(())
}

pub fn handle_download(cfg: &ScanConfig, url: Option<String>) -> Result<()> {
    let url = url.unwrap_or_else(|| cfg.dataset_url.clone());
    match ensure_dataset(&cfg.dataset_path, &url)? {
        Provisioned::AlreadyPresent => {
            info!(path = %cfg.dataset_path.display(), "dataset already present");
            println!("Dataset already present at {}", cfg.dataset_path.display());
        }
        Provisioned::Downloaded { bytes } => {
            info!(path = %cfg.dataset_path.display(), bytes, "dataset ready");
            println!("Downloaded dataset to {}", cfg.dataset_path.display());
        }
    }
    Ok(())
}

pub fn handle_search(cfg: &ScanConfig, keywords: Keywords, page: usize) -> Result<()> {
    let expr = expr_from_args(&keywords)?;
    let scanner = Scanner::from_config(cfg);
    let page = scanner.scan_page(&expr, page_start(page)?)?;
    let mut out = std::io::stdout().lock();
    print_page(&mut out, &page)?;
    Ok(())
}

pub fn handle_count(cfg: &ScanConfig, keywords: Keywords) -> Result<()> {
    let expr = expr_from_args(&keywords)?;
    let scanner = Scanner::from_config(cfg);

    let pb = ProgressBar::new(PROGRESS_TICKS);
    pb.set_style(count_style());
    let total = scanner.count_matches_with_progress(&expr, |p| {
        pb.set_position((p.fraction as f64 * PROGRESS_TICKS as f64) as u64);
        pb.set_message(format!("ongoing total matches: {}", p.matches));
    });
    pb.finish_and_clear();

    println!("Total matches: {}", total?);
    Ok(())
}

pub fn handle_export(cfg: &ScanConfig, keywords: Keywords, out: PathBuf) -> Result<()> {
    let expr = expr_from_args(&keywords)?;
    let scanner = Scanner::from_config(cfg);
    let summary = scanner.export_matches(&expr, &cfg.export_dir.join(out))?;
    info!(rows = summary.rows, path = %summary.path.display(), "export finished");
    println!("Downloaded {}", summary.path.display());
    Ok(())
}
