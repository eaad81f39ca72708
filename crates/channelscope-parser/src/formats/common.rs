use csv::StringRecord;
use polars::prelude::*;
use tracing::warn;

use crate::errors::LoadError;
use crate::model::{RowErrorPolicy, RowWarning};

pub(crate) fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).flexible(true);
    builder
}

pub(crate) fn next_header(
    source_name: &'static str,
    records: &mut csv::StringRecordsIter<'_, &[u8]>,
) -> Result<StringRecord, LoadError> {
    records
        .next()
        .ok_or(LoadError::MissingHeader { source_name })?
        .map_err(|err| LoadError::Csv {
            source_name,
            source: err,
        })
}

/// Strips a UTF-8 byte-order mark some exporters put in front of the first header.
pub(crate) fn clean_header(value: &str) -> &str {
    value.trim_start_matches('\u{feff}').trim()
}

pub(crate) fn find_header(header: &StringRecord, name: &str) -> Option<usize> {
    header
        .iter()
        .position(|candidate| clean_header(candidate).eq_ignore_ascii_case(name))
}

pub(crate) fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn parse_optional_f64(
    source_name: &'static str,
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<Option<f64>, LoadError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    trimmed
        .replace(',', "")
        .parse::<f64>()
        .map(Some)
        .map_err(|err| LoadError::DataRow {
            source_name,
            line_index,
            message: format!("failed to parse column '{column}' as number: {err}"),
        })
}

pub(crate) fn parse_flag(
    source_name: &'static str,
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<bool, LoadError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(LoadError::DataRow {
            source_name,
            line_index,
            message: format!("column '{column}' expected a boolean, found '{other}'"),
        }),
    }
}

/// Applies the row policy to a failed row. Structural and I/O errors are never skipped.
pub(crate) fn handle_row_error(
    policy: RowErrorPolicy,
    err: LoadError,
    warnings: &mut Vec<RowWarning>,
) -> Result<(), LoadError> {
    if policy == RowErrorPolicy::Abort || !err.is_row_error() {
        return Err(err);
    }

    let location = match &err {
        LoadError::Date {
            source_name,
            line_index,
            ..
        }
        | LoadError::DataRow {
            source_name,
            line_index,
            ..
        } => Some((*source_name, *line_index)),
        _ => None,
    };
    let Some((source_name, line_index)) = location else {
        return Err(err);
    };

    warn!(source = source_name, line = line_index, error = %err, "skipping unparseable row");
    warnings.push(RowWarning {
        source_name,
        line_index,
        message: err.to_string(),
    });
    Ok(())
}

pub(crate) fn datetime_column(
    source_name: &'static str,
    name: &str,
    micros: Vec<i64>,
) -> Result<Column, LoadError> {
    Series::new(name.into(), micros)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
        .map(Into::into)
        .map_err(|err| LoadError::Polars {
            source_name,
            source: err,
        })
}

/// An export column carried through untouched. Becomes `Float64` when every
/// non-empty cell is numeric, otherwise stays text.
pub(crate) struct PassthroughColumn {
    pub index: usize,
    pub name: String,
    values: Vec<Option<String>>,
}

impl PassthroughColumn {
    pub fn new(index: usize, name: &str) -> Self {
        Self {
            index,
            name: clean_header(name).to_string(),
            values: Vec::new(),
        }
    }

    pub fn cell<'a>(&self, record: &'a StringRecord) -> &'a str {
        record.get(self.index).unwrap_or("")
    }

    pub fn push(&mut self, value: Option<String>) {
        self.values.push(value);
    }

    pub fn into_column(self) -> Column {
        let numeric: Option<Vec<Option<f64>>> = self
            .values
            .iter()
            .map(|value| match value {
                None => Some(None),
                Some(text) => text.replace(',', "").parse::<f64>().ok().map(Some),
            })
            .collect();

        match numeric {
            Some(values) if !self.values.is_empty() => {
                Series::new(self.name.as_str().into(), values).into()
            }
            _ => Series::new(self.name.as_str().into(), self.values).into(),
        }
    }
}

pub(crate) fn passthrough_columns(
    header: &StringRecord,
    bound: &[usize],
) -> Vec<PassthroughColumn> {
    header
        .iter()
        .enumerate()
        .filter(|(idx, name)| !bound.contains(idx) && !clean_header(name).is_empty())
        .map(|(idx, name)| PassthroughColumn::new(idx, name))
        .collect()
}

pub(crate) fn build_frame(
    source_name: &'static str,
    columns: Vec<Column>,
) -> Result<DataFrame, LoadError> {
    DataFrame::new(columns).map_err(|err| LoadError::Polars {
        source_name,
        source: err,
    })
}
