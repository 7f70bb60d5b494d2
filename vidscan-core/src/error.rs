use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid keyword pattern '{term}': {source}")]
    Pattern {
        term: String,
        #[source]
        source: regex::Error,
    },

    #[error("dataset is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("dataset not found: {}", .0.display())]
    DatasetMissing(PathBuf),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to download dataset: HTTP {0}")]
    DownloadStatus(u16),

    #[error("could not persist file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("export destination {} is the dataset itself", .0.display())]
    ExportOverwritesDataset(PathBuf),

    #[error("config error: {0}")]
    Config(String),

    #[error("no active page; run a search first")]
    NoActivePage,
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, VidError>;
