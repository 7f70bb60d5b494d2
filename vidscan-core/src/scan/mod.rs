//! Streaming search over a [`RecordSource`].
//!
//! Every operation opens a fresh pass and applies the keyword filter batch by
//! batch, so at most one raw batch is resident at a time.

use tracing::{debug, info};

use crate::config::{DEFAULT_COUNT_BATCH_ROWS, DEFAULT_PAGE_BATCH_ROWS, ScanConfig};
use crate::domain::{PAGE_SIZE, Page};
use crate::error::Result;
use crate::filter::{KeywordExpr, filter};
use crate::source::{CsvSource, RecordSource};

pub mod count;
pub mod export;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchSizes {
    /// Rows per batch for paged search and export.
    pub page_rows: usize,
    /// Rows per batch for counting.
    pub count_rows: usize,
}

impl Default for BatchSizes {
    fn default() -> Self {
        Self {
            page_rows: DEFAULT_PAGE_BATCH_ROWS,
            count_rows: DEFAULT_COUNT_BATCH_ROWS,
        }
    }
}

pub struct Scanner<S: RecordSource> {
    source: S,
    sizes: BatchSizes,
}

impl Scanner<CsvSource> {
    pub fn from_config(cfg: &ScanConfig) -> Self {
        Self::with_sizes(
            CsvSource::new(&cfg.dataset_path),
            BatchSizes {
                page_rows: cfg.page_batch_rows,
                count_rows: cfg.count_batch_rows,
            },
        )
    }
}

impl<S: RecordSource> Scanner<S> {
    pub fn new(source: S) -> Self {
        Self::with_sizes(source, BatchSizes::default())
    }

    pub fn with_sizes(source: S, sizes: BatchSizes) -> Self {
        Self { source, sizes }
    }

    /// Matches `[start, start + PAGE_SIZE)` of the match stream.
    ///
    /// Stops reading once `start + PAGE_SIZE` matches have been seen. Matches before
    /// `start` are only counted, never buffered.
    pub fn scan_page(&self, expr: &KeywordExpr, start: usize) -> Result<Page> {
        let end = start.saturating_add(PAGE_SIZE);
        let mut seen = 0usize;
        let mut records = Vec::with_capacity(PAGE_SIZE);
        let mut batches = 0u64;

        for batch in self.source.open(self.sizes.page_rows)? {
            let matched = filter(batch?, expr);
            batches += 1;
            for rec in matched {
                if seen >= start && seen < end {
                    records.push(rec);
                }
                seen += 1;
            }
            if seen >= end {
                break;
            }
        }

        debug!(start, batches, seen, "page scan finished");
        info!(start, returned = records.len(), "scanned page");
        Ok(Page { start, records })
    }
}
