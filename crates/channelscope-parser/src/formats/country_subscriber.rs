use polars::prelude::*;

use crate::errors::LoadError;
use crate::model::{LoadOptions, ParsedTable};

use super::common::{
    build_frame, find_header, handle_row_error, next_header, optional_text, parse_flag,
    parse_optional_f64, passthrough_columns, reader_builder,
};
use super::schema::{
    COUNTRY_CODE, COUNTRY_SUBSCRIBER_HEADERS, EXTERNAL_VIDEO_ID, IS_SUBSCRIBED, VIDEO_TITLE, VIEWS,
};

pub const SOURCE_NAME: &str = "country_subscriber";

const EXTERNAL_VIDEO_ID_HEADER: &str = "External Video ID";

struct CountryRow {
    video_title: Option<String>,
    country_code: Option<String>,
    is_subscribed: bool,
    views: Option<f64>,
}

/// Loads the per-country / subscription-status export, binding columns by header name.
pub fn parse_country_subscribers(
    content: &str,
    options: &LoadOptions,
) -> Result<ParsedTable, LoadError> {
    let mut reader = reader_builder().from_reader(content.as_bytes());
    let mut records = reader.records();
    let header = next_header(SOURCE_NAME, &mut records)?;

    let mut bound = Vec::with_capacity(COUNTRY_SUBSCRIBER_HEADERS.len() + 1);
    for required in COUNTRY_SUBSCRIBER_HEADERS {
        let idx = find_header(&header, required.header).ok_or(LoadError::MissingColumn {
            source_name: SOURCE_NAME,
            column: required.header,
        })?;
        bound.push(idx);
    }
    let (title_idx, country_idx, subscribed_idx, views_idx) =
        (bound[0], bound[1], bound[2], bound[3]);

    let external_id_idx = find_header(&header, EXTERNAL_VIDEO_ID_HEADER);
    if let Some(idx) = external_id_idx {
        bound.push(idx);
    }

    let mut passthrough = passthrough_columns(&header, &bound);
    let mut titles = Vec::new();
    let mut countries = Vec::new();
    let mut subscribed = Vec::new();
    let mut views = Vec::new();
    let mut external_ids = Vec::new();
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
        let parsed = parse_flag(SOURCE_NAME, cell(subscribed_idx), line_index, "Is Subscribed")
            .and_then(|is_subscribed| {
                parse_optional_f64(SOURCE_NAME, cell(views_idx), line_index, "Views").map(
                    |views| CountryRow {
                        video_title: optional_text(cell(title_idx)),
                        country_code: optional_text(cell(country_idx)),
                        is_subscribed,
                        views,
                    },
                )
            });

        match parsed {
            Ok(row) => {
                titles.push(row.video_title);
                countries.push(row.country_code);
                subscribed.push(row.is_subscribed);
                views.push(row.views);
                if let Some(idx) = external_id_idx {
                    external_ids.push(optional_text(cell(idx)));
                }
                for column in passthrough.iter_mut() {
                    let value = optional_text(column.cell(&record));
                    column.push(value);
                }
            }
            Err(err) => handle_row_error(options.row_errors, err, &mut warnings)?,
        }
    }

    let mut columns: Vec<Column> = vec![
        Series::new(VIDEO_TITLE.into(), titles).into(),
        Series::new(COUNTRY_CODE.into(), countries).into(),
        Series::new(IS_SUBSCRIBED.into(), subscribed).into(),
        Series::new(VIEWS.into(), views).into(),
    ];
    if external_id_idx.is_some() {
        columns.push(Series::new(EXTERNAL_VIDEO_ID.into(), external_ids).into());
    }
    columns.extend(passthrough.into_iter().map(|column| column.into_column()));

    Ok(ParsedTable {
        df: build_frame(SOURCE_NAME, columns)?,
        warnings,
    })
}
