// vidscan_core/src/domain.rs
use std::path::PathBuf;

use csv::StringRecord;
use serde::Serialize;

use crate::error::{Result, VidError};

/// Matches per page; offsets always advance by this amount.
pub const PAGE_SIZE: usize = 50;

pub const NAME_COLUMN: &str = "name";
pub const CONTENT_URL_COLUMN: &str = "contentUrl";

/// Header of a dataset: ordered column names plus where the two searched columns live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<String>,
    name_idx: usize,
    url_idx: usize,
}

impl Schema {
    pub fn new(columns: Vec<String>) -> Result<Self> {
        let find = |want: &'static str| {
            columns
                .iter()
                .position(|c| c == want)
                .ok_or(VidError::MissingColumn(want))
        };
        let name_idx = find(NAME_COLUMN)?;
        let url_idx = find(CONTENT_URL_COLUMN)?;
        Ok(Self {
            columns,
            name_idx,
            url_idx,
        })
    }

    /// The two required columns and nothing else.
    pub fn minimal() -> Self {
        Self {
            columns: vec![NAME_COLUMN.to_string(), CONTENT_URL_COLUMN.to_string()],
            name_idx: 0,
            url_idx: 1,
        }
    }

    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        Self::new(headers.iter().map(str::to_string).collect())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Passthrough column names, in the order `Record::extra` stores them.
    pub fn extra_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.name_idx && *i != self.url_idx)
            .map(|(_, c)| c.as_str())
    }

    /// Missing trailing fields read as empty strings.
    pub fn record_from_row(&self, row: &StringRecord) -> Record {
        let field = |i: usize| row.get(i).unwrap_or("").to_string();
        let extra = (0..self.columns.len())
            .filter(|i| *i != self.name_idx && *i != self.url_idx)
            .map(field)
            .collect();
        Record {
            name: field(self.name_idx),
            content_url: field(self.url_idx),
            extra,
        }
    }

    /// Rebuild a row in original column order.
    pub fn row_for<'a>(&self, rec: &'a Record) -> Vec<&'a str> {
        let mut extra = rec.extra.iter();
        (0..self.columns.len())
            .map(|i| {
                if i == self.name_idx {
                    rec.name.as_str()
                } else if i == self.url_idx {
                    rec.content_url.as_str()
                } else {
                    extra.next().map(String::as_str).unwrap_or("")
                }
            })
            .collect()
    }
}

/// One dataset row. `extra` holds passthrough values aligned with `Schema::extra_columns`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Record {
    pub name: String,
    #[serde(rename = "contentUrl")]
    pub content_url: String,
    pub extra: Vec<String>,
}

impl Record {
    pub fn new(name: impl Into<String>, content_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_url: content_url.into(),
            extra: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub start: usize,
    pub records: Vec<Record>,
}

impl Page {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct CountProgress {
    pub batches_done: u64,
    pub rows_scanned: u64,
    pub matches: u64,
    /// Approximate share of the file scanned, 0.0..=1.0. UI hint only.
    pub fraction: f32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: u64,
}
