//! Keyword matching over the `name` column.
//!
//! Positive terms are OR-combined; a record is kept when its name matches any of
//! them. Negative terms are applied one at a time and each one removes the records
//! it matches. Every term is a case-insensitive regular expression, so plain words
//! behave as substrings.

use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::domain::Record;
use crate::error::{Result, VidError};

#[derive(Clone, Debug)]
pub struct KeywordExpr {
    /// `None` when no positive term survived splitting: such an expression matches nothing.
    positive: Option<Regex>,
    negatives: Vec<Regex>,
}

fn compile(term: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(term).case_insensitive(true).build()
}

impl KeywordExpr {
    /// Build from the raw inputs: `positive` and `negative` are comma separated lists.
    pub fn parse(positive: &str, negative: &str) -> Result<Self> {
        Self::with_negatives(positive, negative.split(','))
    }

    /// Like [`KeywordExpr::parse`], with the negative terms already split.
    pub fn with_negatives<I, S>(positive: &str, negatives: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // Positive terms are taken verbatim; only empty ones are dropped.
        let terms: Vec<&str> = positive.split(',').filter(|t| !t.is_empty()).collect();
        for term in &terms {
            compile(term).map_err(|source| VidError::Pattern {
                term: (*term).to_string(),
                source,
            })?;
        }
        let positive = if terms.is_empty() {
            None
        } else {
            let alternation = terms
                .iter()
                .map(|t| format!("(?:{t})"))
                .collect::<Vec<_>>()
                .join("|");
            Some(compile(&alternation).map_err(|source| VidError::Pattern {
                term: positive.to_string(),
                source,
            })?)
        };

        let mut compiled = Vec::new();
        for term in negatives {
            let term = term.as_ref().trim();
            if term.is_empty() {
                continue;
            }
            match compile(term) {
                Ok(re) => compiled.push(re),
                Err(e) => warn!(term, error = %e, "skipping invalid negative keyword"),
            }
        }

        Ok(Self {
            positive,
            negatives: compiled,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        let Some(positive) = &self.positive else {
            return false;
        };
        positive.is_match(name) && !self.negatives.iter().any(|re| re.is_match(name))
    }

    #[cfg(test)]
    fn negative_terms(&self) -> usize {
        self.negatives.len()
    }
}

/// Keep the records whose name satisfies `expr`, preserving order.
pub fn filter(batch: Vec<Record>, expr: &KeywordExpr) -> Vec<Record> {
    batch.into_iter().filter(|r| expr.matches(&r.name)).collect()
}

/// One-shot form taking the raw keyword inputs.
pub fn filter_batch(batch: Vec<Record>, positive: &str, negative: &str) -> Result<Vec<Record>> {
    let expr = KeywordExpr::parse(positive, negative)?;
    Ok(filter(batch, &expr))
}
