use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateAttempt {
    pub rule: &'static str,
    pub message: String,
}

impl DateAttempt {
    pub fn new(rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

impl fmt::Display for DateAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule, self.message)
    }
}

/// Every rule in the list rejected the value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{value}' matched no date rule; attempts: {}", format_attempts(.attempts))]
pub struct DateParseError {
    pub value: String,
    pub attempts: Vec<DateAttempt>,
}

fn format_attempts(attempts: &[DateAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{source_name} structural mismatch at line {line_index}: expected {expected} columns, found {found}")]
    StructuralMismatch {
        source_name: &'static str,
        line_index: usize,
        expected: usize,
        found: usize,
    },

    #[error("{source_name} header column {position} is '{found}', expected '{expected}'")]
    InvalidHeader {
        source_name: &'static str,
        position: usize,
        found: String,
        expected: &'static str,
    },

    #[error("{source_name} is missing required column '{column}'")]
    MissingColumn {
        source_name: &'static str,
        column: &'static str,
    },

    #[error("{source_name} file is missing its header row")]
    MissingHeader { source_name: &'static str },

    #[error("{source_name} data row {line_index} has an unparseable date: {source}")]
    Date {
        source_name: &'static str,
        line_index: usize,
        #[source]
        source: DateParseError,
    },

    #[error("{source_name} data row {line_index} invalid: {message}")]
    DataRow {
        source_name: &'static str,
        line_index: usize,
        message: String,
    },

    #[error("{source_name} CSV error: {source}")]
    Csv {
        source_name: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{source_name} dataframe construction failed: {source}")]
    Polars {
        source_name: &'static str,
        #[source]
        source: polars::error::PolarsError,
    },
}

impl LoadError {
    /// Row-scoped failures may be skipped under [`crate::RowErrorPolicy::Skip`].
    pub fn is_row_error(&self) -> bool {
        matches!(self, LoadError::Date { .. } | LoadError::DataRow { .. })
    }
}
