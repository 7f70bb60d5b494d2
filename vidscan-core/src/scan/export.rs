use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::domain::ExportSummary;
use crate::error::{Result, VidError};
use crate::filter::{KeywordExpr, filter};
use crate::source::RecordSource;

use super::Scanner;

/// Append `.csv` unless the path already ends with it.
pub fn with_csv_suffix(path: &Path) -> PathBuf {
    let s = path.as_os_str().to_string_lossy();
    if s.ends_with(".csv") {
        path.to_path_buf()
    } else {
        PathBuf::from(format!("{s}.csv"))
    }
}

/// Absolute form of `path`; for a file that does not exist yet, its directory is
/// resolved instead.
fn resolve(path: &Path) -> Option<PathBuf> {
    if let Ok(p) = path.canonicalize() {
        return Some(p);
    }
    let name = path.file_name()?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    dir.canonicalize().ok().map(|d| d.join(name))
}

fn same_file(a: &Path, b: &Path) -> bool {
    matches!((resolve(a), resolve(b)), (Some(a), Some(b)) if a == b)
}

impl<S: RecordSource> Scanner<S> {
    /// Write every match, header first, to `destination` (`.csv` appended if missing).
    ///
    /// Rows go to a temp file in the destination directory which replaces the
    /// destination only after the whole pass succeeded.
    pub fn export_matches(
        &self,
        expr: &KeywordExpr,
        destination: &Path,
    ) -> Result<ExportSummary> {
        let path = with_csv_suffix(destination);
        if let Some(source) = self.source.backing_path() {
            if same_file(source, &path) {
                return Err(VidError::ExportOverwritesDataset(path));
            }
        }
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let stream = self.source.open(self.sizes.page_rows)?;
        let schema = stream.schema().clone();
        let tmp = NamedTempFile::new_in(&dir)?;
        let mut wtr = csv::Writer::from_writer(tmp);
        wtr.write_record(schema.columns())?;

        let mut rows = 0u64;
        for batch in stream {
            for rec in filter(batch?, expr) {
                wtr.write_record(schema.row_for(&rec))?;
                rows += 1;
            }
        }

        let tmp = wtr
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        tmp.persist(&path)?;
        info!(path = %path.display(), rows, "exported matches");
        Ok(ExportSummary { path, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CsvSource;

    #[test]
    fn csv_suffix_is_added_once() {
        assert_eq!(with_csv_suffix(Path::new("results")), PathBuf::from("results.csv"));
        assert_eq!(with_csv_suffix(Path::new("results.csv")), PathBuf::from("results.csv"));
        assert_eq!(
            with_csv_suffix(Path::new("out/cats.v2")),
            PathBuf::from("out/cats.v2.csv")
        );
    }

    fn dataset(dir: &Path) -> PathBuf {
        let path = dir.join("results_10M_train.csv");
        std::fs::write(&path, "name,contentUrl\ncat a,u1\ndog b,u2\ncat c,u3\n").unwrap();
        path
    }

    #[test]
    fn refuses_to_overwrite_the_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let data = dataset(dir.path());
        let scanner = Scanner::new(CsvSource::new(&data));
        let expr = KeywordExpr::parse("cat", "").unwrap();

        for dest in [
            dir.path().join("results_10M_train"),
            dir.path().join("results_10M_train.csv"),
            dir.path().join(".").join("results_10M_train"),
        ] {
            let err = scanner.export_matches(&expr, &dest).unwrap_err();
            assert!(matches!(err, VidError::ExportOverwritesDataset(_)));
        }

        let dog = KeywordExpr::parse("dog", "").unwrap();
        assert_eq!(scanner.count_matches(&dog).unwrap(), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn sibling_destination_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let data = dataset(dir.path());
        let scanner = Scanner::new(CsvSource::new(&data));
        let expr = KeywordExpr::parse("cat", "").unwrap();

        let summary = scanner
            .export_matches(&expr, &dir.path().join("results"))
            .unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(
            std::fs::read_to_string(&data).unwrap(),
            "name,contentUrl\ncat a,u1\ndog b,u2\ncat c,u3\n"
        );
    }
}
