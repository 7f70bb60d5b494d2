//! Per-session paging state.
//!
//! A session is either `Idle` (nothing searched yet) or `Paged` at some offset
//! with the page found there. Each transition rescans the source from the
//! start; no cursor is carried between calls.

use crate::domain::{PAGE_SIZE, Page};
use crate::error::{Result, VidError};
use crate::filter::KeywordExpr;
use crate::scan::Scanner;
use crate::source::RecordSource;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum PagingState {
    #[default]
    Idle,
    Paged { offset: usize, page: Page },
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    state: PagingState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> usize {
        match &self.state {
            PagingState::Idle => 0,
            PagingState::Paged { offset, .. } => *offset,
        }
    }

    pub fn page(&self) -> Option<&Page> {
        match &self.state {
            PagingState::Idle => None,
            PagingState::Paged { page, .. } => Some(page),
        }
    }

    pub fn is_paged(&self) -> bool {
        matches!(self.state, PagingState::Paged { .. })
    }

    /// New search: back to offset 0.
    pub fn search<S: RecordSource>(
        &mut self,
        scanner: &Scanner<S>,
        expr: &KeywordExpr,
    ) -> Result<&Page> {
        self.load(scanner, expr, 0)
    }

    /// Advance one page. Only valid once a search has run; the offset moves only
    /// if the scan succeeds.
    pub fn next<S: RecordSource>(
        &mut self,
        scanner: &Scanner<S>,
        expr: &KeywordExpr,
    ) -> Result<&Page> {
        let PagingState::Paged { offset, .. } = &self.state else {
            return Err(VidError::NoActivePage);
        };
        let offset = offset.saturating_add(PAGE_SIZE);
        self.load(scanner, expr, offset)
    }

    /// Re-run the current keywords at the current offset.
    pub fn update<S: RecordSource>(
        &mut self,
        scanner: &Scanner<S>,
        expr: &KeywordExpr,
    ) -> Result<&Page> {
        let offset = self.offset();
        self.load(scanner, expr, offset)
    }

    fn load<S: RecordSource>(
        &mut self,
        scanner: &Scanner<S>,
        expr: &KeywordExpr,
        offset: usize,
    ) -> Result<&Page> {
        let page = scanner.scan_page(expr, offset)?;
        self.state = PagingState::Paged { offset, page };
        self.page().ok_or(VidError::NoActivePage)
    }
}
