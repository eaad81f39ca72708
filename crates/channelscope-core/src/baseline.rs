use chrono::{Months, NaiveDateTime};
use channelscope_parser::dates::{from_micros, to_micros};
use channelscope_parser::schema::PUBLISH_TIME;
use polars::prelude::*;
use serde::Serialize;

use crate::columns::{datetime_micros, is_numeric};
use crate::error::{PipelineError, Result};

/// Per-column medians over the videos published in a trailing window.
#[derive(Debug, Clone, Serialize)]
pub struct BaselineMedians {
    pub window_months: u32,
    pub cutoff: Option<NaiveDateTime>,
    pub cohort_size: usize,
    /// `(column, median)` in frame order; NaN when the window holds no values.
    pub medians: Vec<(String, f64)>,
}

impl BaselineMedians {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.medians
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| *value)
    }
}

/// A display metric's recent median against its reference median.
#[derive(Debug, Clone, Serialize)]
pub struct MetricComparison {
    pub metric: String,
    pub short_window_median: f64,
    pub long_window_median: f64,
    /// `(short − long) / long`; infinite or NaN when the long median is zero.
    pub delta: f64,
}

/// `max(publish_time) − months`, or `None` for a frame without videos.
pub fn window_cutoff(videos: &DataFrame, months: u32) -> Result<Option<i64>> {
    let Some(latest) = datetime_micros(videos, PUBLISH_TIME)?.into_iter().flatten().max() else {
        return Ok(None);
    };
    let cutoff = from_micros(latest)
        .and_then(|latest| latest.checked_sub_months(Months::new(months)))
        .ok_or(PipelineError::InvalidTimestamp(latest))?;
    Ok(Some(to_micros(cutoff)))
}

/// Every `Float64`/`Int64` column, in frame order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|column| is_numeric(column.dtype()))
        .map(|column| column.name().to_string())
        .collect()
}

/// Medians of `columns` over the videos published on or after the window
/// cutoff. NaN values (0/0 ratios) and nulls are skipped; a column with no
/// remaining values gets a NaN median.
pub fn trailing_window_medians(
    videos: &DataFrame,
    months: u32,
    columns: &[String],
) -> Result<BaselineMedians> {
    let Some(cutoff) = window_cutoff(videos, months)? else {
        return Ok(BaselineMedians {
            window_months: months,
            cutoff: None,
            cohort_size: 0,
            medians: columns.iter().map(|name| (name.clone(), f64::NAN)).collect(),
        });
    };

    let window = videos
        .clone()
        .lazy()
        .filter(col(PUBLISH_TIME).cast(DataType::Int64).gt_eq(lit(cutoff)))
        .collect()?;

    let mut medians = Vec::with_capacity(columns.len());
    if !columns.is_empty() {
        let exprs: Vec<Expr> = columns
            .iter()
            .map(|name| {
                let values = col(name.as_str()).cast(DataType::Float64);
                values
                    .clone()
                    .filter(values.is_not_nan())
                    .median()
                    .alias(name.as_str())
            })
            .collect();
        let row = window.clone().lazy().select(exprs).collect()?;
        for name in columns {
            let median = row.column(name)?.f64()?.get(0).unwrap_or(f64::NAN);
            medians.push((name.clone(), median));
        }
    }

    Ok(BaselineMedians {
        window_months: months,
        cutoff: from_micros(cutoff),
        cohort_size: window.height(),
        medians,
    })
}

/// Rewrites every baseline column as `(value − median) / median`; other columns are untouched.
pub fn relative_delta_table(videos: &DataFrame, baseline: &BaselineMedians) -> Result<DataFrame> {
    let exprs: Vec<Expr> = baseline
        .medians
        .iter()
        .map(|(name, median)| {
            ((col(name.as_str()).cast(DataType::Float64) - lit(*median)) / lit(*median))
                .alias(name.as_str())
        })
        .collect();

    Ok(videos.clone().lazy().with_columns(exprs).collect()?)
}

pub fn compare_windows(
    videos: &DataFrame,
    short_months: u32,
    long_months: u32,
    metrics: &[String],
) -> Result<Vec<MetricComparison>> {
    let short = trailing_window_medians(videos, short_months, metrics)?;
    let long = trailing_window_medians(videos, long_months, metrics)?;

    Ok(short
        .medians
        .into_iter()
        .zip(long.medians)
        .map(|((metric, short_median), (_, long_median))| MetricComparison {
            metric,
            short_window_median: short_median,
            long_window_median: long_median,
            delta: (short_median - long_median) / long_median,
        })
        .collect())
}
