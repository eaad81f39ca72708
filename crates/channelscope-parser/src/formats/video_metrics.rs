use csv::StringRecord;
use polars::prelude::*;
use tracing::{debug, warn};

use crate::dates::{parse_duration_seconds, parse_publish_date, to_micros};
use crate::errors::LoadError;
use crate::model::{LoadOptions, ParsedTable};

use super::common::{
    build_frame, clean_header, datetime_column, handle_row_error, next_header, optional_text,
    parse_optional_f64, reader_builder,
};
use super::schema::{ColumnKind, VIDEO_SCHEMA};

pub const SOURCE_NAME: &str = "video_metrics";

/// Lines consumed before the first bound data row: the header and the totals row.
const LEADING_LINES: usize = 2;

enum Cell {
    Text(Option<String>),
    Date(i64),
    Metric(Option<f64>),
}

enum ColumnValues {
    Text(Vec<Option<String>>),
    Date(Vec<i64>),
    Metric(Vec<Option<f64>>),
}

impl ColumnValues {
    fn for_kind(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Text | ColumnKind::Duration => ColumnValues::Text(Vec::new()),
            ColumnKind::PublishDate => ColumnValues::Date(Vec::new()),
            ColumnKind::Metric => ColumnValues::Metric(Vec::new()),
        }
    }

    fn push(&mut self, cell: Cell) {
        match (self, cell) {
            (ColumnValues::Text(values), Cell::Text(value)) => values.push(value),
            (ColumnValues::Date(values), Cell::Date(value)) => values.push(value),
            (ColumnValues::Metric(values), Cell::Metric(value)) => values.push(value),
            _ => unreachable!("cell kind is derived from the same schema column"),
        }
    }

    fn into_column(self, name: &str) -> Result<Column, LoadError> {
        match self {
            ColumnValues::Text(values) => Ok(Series::new(name.into(), values).into()),
            ColumnValues::Date(values) => datetime_column(SOURCE_NAME, name, values),
            ColumnValues::Metric(values) => Ok(Series::new(name.into(), values).into()),
        }
    }
}

/// Loads the per-video export into the canonical 19-column table.
///
/// The header must have exactly one field per schema column. The first data
/// row is the export's channel totals and is discarded.
pub fn parse_video_metrics(content: &str, options: &LoadOptions) -> Result<ParsedTable, LoadError> {
    let mut reader = reader_builder().from_reader(content.as_bytes());
    let mut records = reader.records();

    let header = next_header(SOURCE_NAME, &mut records)?;
    validate_header(&header, options)?;

    if let Some(totals) = records.next() {
        let totals = totals.map_err(|err| LoadError::Csv {
            source_name: SOURCE_NAME,
            source: err,
        })?;
        debug!(first_cell = totals.get(0).unwrap_or(""), "discarding totals row");
    }

    let mut columns: Vec<ColumnValues> = VIDEO_SCHEMA
        .iter()
        .map(|column| ColumnValues::for_kind(column.kind()))
        .collect();
    let mut warnings = Vec::new();

    for (row_idx, record) in records.enumerate() {
        let line_index = row_idx + LEADING_LINES + 1;
        let record = record.map_err(|err| LoadError::Csv {
            source_name: SOURCE_NAME,
            source: err,
        })?;

        if record.len() != VIDEO_SCHEMA.len() {
            return Err(LoadError::StructuralMismatch {
                source_name: SOURCE_NAME,
                line_index,
                expected: VIDEO_SCHEMA.len(),
                found: record.len(),
            });
        }

        match parse_row(&record, line_index) {
            Ok(cells) => {
                for (values, cell) in columns.iter_mut().zip(cells) {
                    values.push(cell);
                }
            }
            Err(err) => handle_row_error(options.row_errors, err, &mut warnings)?,
        }
    }

    let frame_columns = columns
        .into_iter()
        .zip(VIDEO_SCHEMA.iter())
        .map(|(values, column)| values.into_column(column.canonical_name()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedTable {
        df: build_frame(SOURCE_NAME, frame_columns)?,
        warnings,
    })
}

fn validate_header(header: &StringRecord, options: &LoadOptions) -> Result<(), LoadError> {
    if header.len() != VIDEO_SCHEMA.len() {
        return Err(LoadError::StructuralMismatch {
            source_name: SOURCE_NAME,
            line_index: 1,
            expected: VIDEO_SCHEMA.len(),
            found: header.len(),
        });
    }

    for (position, (column, found)) in VIDEO_SCHEMA.iter().zip(header.iter()).enumerate() {
        if column.matches_header(found) {
            continue;
        }
        if options.strict_headers {
            return Err(LoadError::InvalidHeader {
                source_name: SOURCE_NAME,
                position,
                found: clean_header(found).to_string(),
                expected: column.canonical_name(),
            });
        }
        warn!(
            position,
            found = clean_header(found),
            bound_to = column.canonical_name(),
            "unexpected per-video header, binding by position"
        );
    }

    Ok(())
}

fn parse_row(record: &StringRecord, line_index: usize) -> Result<Vec<Cell>, LoadError> {
    VIDEO_SCHEMA
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let value = record.get(idx).unwrap_or("");
            match column.kind() {
                ColumnKind::Text => Ok(Cell::Text(optional_text(value))),
                ColumnKind::PublishDate => parse_publish_date(value)
                    .map(|date| Cell::Date(to_micros(date)))
                    .map_err(|err| LoadError::Date {
                        source_name: SOURCE_NAME,
                        line_index,
                        source: err,
                    }),
                ColumnKind::Duration => parse_duration_seconds(value)
                    .map(|_| Cell::Text(optional_text(value)))
                    .map_err(|err| LoadError::Date {
                        source_name: SOURCE_NAME,
                        line_index,
                        source: err,
                    }),
                ColumnKind::Metric => {
                    parse_optional_f64(SOURCE_NAME, value, line_index, column.canonical_name())
                        .map(Cell::Metric)
                }
            }
        })
        .collect()
}
