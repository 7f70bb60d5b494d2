#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod provision;
pub mod scan;
pub mod session;
pub mod source;

// Re-exports: stable API surface
pub use config::ScanConfig;
pub use domain::{CountProgress, ExportSummary, PAGE_SIZE, Page, Record, Schema};
pub use filter::{KeywordExpr, filter, filter_batch};
pub use provision::{Provisioned, dataset_present, ensure_dataset};
pub use scan::export::with_csv_suffix;
pub use scan::{BatchSizes, Scanner};
pub use session::Session;
pub use source::{CsvSource, MemorySource, RecordSource};
