// vidscan_core/src/source.rs
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::debug;

use crate::domain::{Record, Schema};
use crate::error::{Result, VidError};

/// One pass over a dataset, yielding fixed-size batches of records.
pub trait BatchStream: Iterator<Item = Result<Vec<Record>>> + Send {
    fn schema(&self) -> &Schema;
}

pub trait RecordSource: Send + Sync {
    /// Start a fresh pass from the first row.
    fn open(&self, batch_rows: usize) -> Result<Box<dyn BatchStream + '_>>;

    /// Number of data rows, used only for progress estimates.
    fn row_count(&self) -> Result<u64>;

    /// File the records are read from, if any.
    fn backing_path(&self) -> Option<&Path> {
        None
    }
}

/// A CSV file with a header row, read lazily.
#[derive(Clone, Debug)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_present(&self) -> Result<()> {
        if !self.path.is_file() {
            return Err(VidError::DatasetMissing(self.path.clone()));
        }
        Ok(())
    }
}

impl RecordSource for CsvSource {
    fn open(&self, batch_rows: usize) -> Result<Box<dyn BatchStream + '_>> {
        self.ensure_present()?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;
        let schema = Schema::from_headers(reader.headers()?)?;
        debug!(path = %self.path.display(), batch_rows, "opened dataset");
        Ok(Box::new(CsvBatches {
            reader,
            schema,
            row: StringRecord::new(),
            batch_rows: batch_rows.max(1),
            done: false,
        }))
    }

    fn row_count(&self) -> Result<u64> {
        self.ensure_present()?;
        let lines = count_lines(File::open(&self.path)?)?;
        Ok(lines.saturating_sub(1))
    }

    fn backing_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

struct CsvBatches {
    reader: csv::Reader<File>,
    schema: Schema,
    row: StringRecord,
    batch_rows: usize,
    done: bool,
}

impl CsvBatches {
    fn load_next(&mut self) -> Result<Option<Vec<Record>>> {
        let mut batch = Vec::with_capacity(self.batch_rows);
        while batch.len() < self.batch_rows {
            if !self.reader.read_record(&mut self.row)? {
                self.done = true;
                break;
            }
            batch.push(self.schema.record_from_row(&self.row));
        }
        Ok(if batch.is_empty() { None } else { Some(batch) })
    }
}

impl Iterator for CsvBatches {
    type Item = Result<Vec<Record>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.load_next() {
            Ok(batch) => batch.map(Ok),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl BatchStream for CsvBatches {
    fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// Newline count of a stream, read in fixed-size chunks.
pub fn count_lines<R: Read>(inner: R) -> Result<u64> {
    let mut reader = BufReader::new(inner);
    let mut buf = [0u8; 64 * 1024];
    let mut lines = 0u64;
    let mut last = b'\n';
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        lines += buf[..n].iter().filter(|b| **b == b'\n').count() as u64;
        last = buf[n - 1];
    }
    // unterminated final line
    if last != b'\n' {
        lines += 1;
    }
    Ok(lines)
}

/// Records held in memory; each pass clones batches out of the backing vector.
#[derive(Clone, Debug)]
pub struct MemorySource {
    schema: Schema,
    records: Vec<Record>,
}

impl MemorySource {
    pub fn new(schema: Schema, records: Vec<Record>) -> Self {
        Self { schema, records }
    }

    /// Two-column source (`name`, `contentUrl`).
    pub fn from_records(records: Vec<Record>) -> Self {
        Self::new(Schema::minimal(), records)
    }
}

struct MemoryBatches<'a> {
    schema: &'a Schema,
    chunks: std::slice::Chunks<'a, Record>,
}

impl Iterator for MemoryBatches<'_> {
    type Item = Result<Vec<Record>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next().map(|c| Ok(c.to_vec()))
    }
}

impl BatchStream for MemoryBatches<'_> {
    fn schema(&self) -> &Schema {
        self.schema
    }
}

impl RecordSource for MemorySource {
    fn open(&self, batch_rows: usize) -> Result<Box<dyn BatchStream + '_>> {
        Ok(Box::new(MemoryBatches {
            schema: &self.schema,
            chunks: self.records.chunks(batch_rows.max(1)),
        }))
    }

    fn row_count(&self) -> Result<u64> {
        Ok(self.records.len() as u64)
    }
}
