use polars::prelude::*;

use crate::dates::{parse_daily_date, to_micros};
use crate::errors::LoadError;
use crate::model::{LoadOptions, ParsedTable};

use super::common::{
    build_frame, datetime_column, find_header, handle_row_error, next_header, optional_text,
    parse_optional_f64, passthrough_columns, reader_builder,
};
use super::schema::{DAILY_PERFORMANCE_HEADERS, DATE, EXTERNAL_VIDEO_ID, VIDEO_TITLE, VIEWS};

pub const SOURCE_NAME: &str = "daily_performance";

/// Loads the per-video daily time series. Dates are `"<day> <Mon> <year>"`
/// with "Sept" accepted for September.
pub fn parse_daily_performance(
    content: &str,
    options: &LoadOptions,
) -> Result<ParsedTable, LoadError> {
    let mut reader = reader_builder().from_reader(content.as_bytes());
    let mut records = reader.records();
    let header = next_header(SOURCE_NAME, &mut records)?;

    let bound = DAILY_PERFORMANCE_HEADERS
        .iter()
        .map(|required| {
            find_header(&header, required.header).ok_or(LoadError::MissingColumn {
                source_name: SOURCE_NAME,
                column: required.header,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let (id_idx, title_idx, date_idx, views_idx) = (bound[0], bound[1], bound[2], bound[3]);

    let mut passthrough = passthrough_columns(&header, &bound);
    let mut external_ids = Vec::new();
    let mut titles = Vec::new();
    let mut dates = Vec::new();
    let mut views = Vec::new();
    let mut warnings = Vec::new();

    for (row_idx, record) in records.enumerate() {
        let line_index = row_idx + 2;
        let record = record.map_err(|err| LoadError::Csv {
            source_name: SOURCE_NAME,
            source: err,
        })?;
        if record.len() != header.len() {
            return Err(LoadError::StructuralMismatch {
                source_name: SOURCE_NAME,
                line_index,
                expected: header.len(),
                found: record.len(),
            });
        }

        let cell = |idx: usize| record.get(idx).unwrap_or("");
        let parsed = parse_daily_date(cell(date_idx))
            .map_err(|err| LoadError::Date {
                source_name: SOURCE_NAME,
                line_index,
                source: err,
            })
            .and_then(|date| {
                parse_optional_f64(SOURCE_NAME, cell(views_idx), line_index, "Views")
                    .map(|value| (to_micros(date), value))
            });

        match parsed {
            Ok((date, value)) => {
                external_ids.push(optional_text(cell(id_idx)));
                titles.push(optional_text(cell(title_idx)));
                dates.push(date);
                views.push(value);
                for column in passthrough.iter_mut() {
                    let value = optional_text(column.cell(&record));
                    column.push(value);
                }
            }
            Err(err) => handle_row_error(options.row_errors, err, &mut warnings)?,
        }
    }

    let mut columns: Vec<Column> = vec![
        Series::new(EXTERNAL_VIDEO_ID.into(), external_ids).into(),
        Series::new(VIDEO_TITLE.into(), titles).into(),
        datetime_column(SOURCE_NAME, DATE, dates)?,
        Series::new(VIEWS.into(), views).into(),
    ];
    columns.extend(passthrough.into_iter().map(|column| column.into_column()));

    Ok(ParsedTable {
        df: build_frame(SOURCE_NAME, columns)?,
        warnings,
    })
}
