use std::collections::HashMap;

use csv::StringRecord;
use polars::prelude::*;

use crate::errors::LoadError;

use super::common::{build_frame, clean_header, next_header, optional_text, reader_builder};

pub const SOURCE_NAME: &str = "comments";

/// Loads an export without schema binding or row filtering: every column is
/// nullable text under its original header, short rows are padded with nulls.
/// A repeated header becomes `<name>_duplicated_<n>`.
pub fn parse_raw_table(content: &str) -> Result<DataFrame, LoadError> {
    let mut reader = reader_builder().from_reader(content.as_bytes());
    let mut records = reader.records();
    let header = next_header(SOURCE_NAME, &mut records)?;

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); header.len()];

    for (row_idx, record) in records.enumerate() {
        let record = record.map_err(|err| LoadError::Csv {
            source_name: SOURCE_NAME,
            source: err,
        })?;
        if record.len() > header.len() {
            return Err(LoadError::StructuralMismatch {
                source_name: SOURCE_NAME,
                line_index: row_idx + 2,
                expected: header.len(),
                found: record.len(),
            });
        }
        for (idx, column) in values.iter_mut().enumerate() {
            column.push(record.get(idx).and_then(optional_text));
        }
    }

    let columns = unique_names(&header)
        .into_iter()
        .zip(values)
        .map(|(name, column)| Column::from(Series::new(name.into(), column)))
        .collect::<Vec<_>>();

    build_frame(SOURCE_NAME, columns)
}

fn unique_names(header: &StringRecord) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .map(|name| {
            let name = clean_header(name).to_string();
            match seen.get_mut(&name) {
                Some(repeats) => {
                    let renamed = format!("{name}_duplicated_{repeats}");
                    *repeats += 1;
                    renamed
                }
                None => {
                    seen.insert(name.clone(), 0);
                    name
                }
            }
        })
        .collect()
}
