use std::fmt;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// What to do with a data row whose cells fail to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorPolicy {
    /// Fail the whole load on the first bad row.
    #[default]
    Abort,
    /// Drop the row and record a [`RowWarning`].
    Skip,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub row_errors: RowErrorPolicy,
    /// Reject per-video headers that do not match the expected spelling
    /// instead of warning and binding by position.
    pub strict_headers: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
    pub source_name: &'static str,
    pub line_index: usize,
    pub message: String,
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} line {}: {}",
            self.source_name, self.line_index, self.message
        )
    }
}

#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub df: DataFrame,
    pub warnings: Vec<RowWarning>,
}

impl ParsedTable {
    pub fn height(&self) -> usize {
        self.df.height()
    }
}
