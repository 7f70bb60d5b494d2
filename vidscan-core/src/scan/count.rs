use tracing::{debug, info};

use crate::domain::CountProgress;
use crate::error::Result;
use crate::filter::{KeywordExpr, filter};
use crate::source::RecordSource;

use super::Scanner;

/// Share of the file covered after `batches_done` batches, clamped to 1.0.
///
/// Counts whole batches, so the last (possibly short) batch overshoots; fine for a
/// progress bar.
pub fn progress_fraction(batches_done: u64, batch_rows: usize, total_rows: u64) -> f32 {
    if total_rows == 0 {
        return 1.0;
    }
    let covered = batches_done as f64 * batch_rows as f64;
    (covered / total_rows as f64).min(1.0) as f32
}

impl<S: RecordSource> Scanner<S> {
    pub fn count_matches(&self, expr: &KeywordExpr) -> Result<u64> {
        self.count_matches_with_progress(expr, |_| {})
    }

    /// Full pass; `on_progress` fires after every batch and once more at 100%.
    pub fn count_matches_with_progress<F>(
        &self,
        expr: &KeywordExpr,
        mut on_progress: F,
    ) -> Result<u64>
    where
        F: FnMut(&CountProgress),
    {
        let batch_rows = self.sizes.count_rows;
        let total_rows = self.source.row_count()?;
        let mut progress = CountProgress::default();

        for batch in self.source.open(batch_rows)? {
            let batch = batch?;
            progress.rows_scanned += batch.len() as u64;
            progress.matches += filter(batch, expr).len() as u64;
            progress.batches_done += 1;
            progress.fraction = progress_fraction(progress.batches_done, batch_rows, total_rows);
            debug!(
                batches = progress.batches_done,
                matches = progress.matches,
                fraction = progress.fraction,
                "count progress"
            );
            on_progress(&progress);
        }

        progress.fraction = 1.0;
        on_progress(&progress);
        info!(
            matches = progress.matches,
            rows = progress.rows_scanned,
            "counted matches"
        );
        Ok(progress.matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use crate::scan::BatchSizes;
    use crate::source::MemorySource;

    #[test]
    fn fraction_clamps_and_handles_empty_file() {
        assert_eq!(progress_fraction(1, 10, 40), 0.25);
        assert_eq!(progress_fraction(5, 10, 40), 1.0);
        assert_eq!(progress_fraction(0, 10, 0), 1.0);
    }

    #[test]
    fn counts_every_batch_and_reports_progress() {
        let records: Vec<Record> = (0..25)
            .map(|i| Record::new(if i % 5 == 0 { "beach" } else { "city" }, ""))
            .collect();
        let scanner = Scanner::with_sizes(
            MemorySource::from_records(records),
            BatchSizes {
                page_rows: 10,
                count_rows: 10,
            },
        );
        let expr = KeywordExpr::parse("beach", "").unwrap();

        let mut seen = Vec::new();
        let total = scanner
            .count_matches_with_progress(&expr, |p| seen.push(*p))
            .unwrap();

        assert_eq!(total, 5);
        // three batches plus the closing report
        assert_eq!(seen.len(), 4);
        assert!((seen[0].fraction - 0.4).abs() < 1e-6);
        assert_eq!(seen[0].matches, 2);
        assert_eq!(seen[2].rows_scanned, 25);
        assert_eq!(seen.last().unwrap().fraction, 1.0);
        assert!(seen.windows(2).all(|w| w[0].matches <= w[1].matches));
    }
}
