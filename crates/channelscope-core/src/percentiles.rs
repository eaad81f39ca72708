use channelscope_parser::schema::VIEWS;
use polars::prelude::*;

use crate::alignment::DAYS_PUBLISHED;
use crate::error::Result;

pub const MEAN_VIEWS: &str = "mean_views";
pub const MEDIAN_VIEWS: &str = "median_views";
pub const UPPER_VIEWS: &str = "pct80_views";
pub const LOWER_VIEWS: &str = "pct20_views";

/// The percentile columns carried into the cumulative curve.
pub const BAND_COLUMNS: [&str; 3] = [MEDIAN_VIEWS, UPPER_VIEWS, LOWER_VIEWS];

#[derive(Debug, Clone, Copy)]
pub struct CurveSpec {
    pub first_day: i64,
    pub last_day: i64,
    pub upper_percentile: f64,
    pub lower_percentile: f64,
}

impl Default for CurveSpec {
    fn default() -> Self {
        Self {
            first_day: 0,
            last_day: 30,
            upper_percentile: 80.0,
            lower_percentile: 20.0,
        }
    }
}

impl CurveSpec {
    /// `days_published` within `[first_day, last_day]`.
    pub fn day_range(&self) -> Expr {
        col(DAYS_PUBLISHED)
            .gt_eq(lit(self.first_day))
            .and(col(DAYS_PUBLISHED).lt_eq(lit(self.last_day)))
    }
}

/// Groups cohort rows by `days_published` and summarises their views per day.
///
/// Days outside `[first_day, last_day]` and days without any views value are
/// left out; the result is ascending by day. Quantiles interpolate linearly.
pub fn cohort_view_curve(cohort: &DataFrame, spec: &CurveSpec) -> Result<DataFrame> {
    let views = || col(VIEWS).cast(DataType::Float64);

    Ok(cohort
        .clone()
        .lazy()
        .filter(spec.day_range().and(col(VIEWS).is_not_null()))
        .group_by([col(DAYS_PUBLISHED)])
        .agg([
            views().mean().alias(MEAN_VIEWS),
            views().median().alias(MEDIAN_VIEWS),
            views()
                .quantile(lit(spec.upper_percentile / 100.0), QuantileMethod::Linear)
                .alias(UPPER_VIEWS),
            views()
                .quantile(lit(spec.lower_percentile / 100.0), QuantileMethod::Linear)
                .alias(LOWER_VIEWS),
        ])
        .sort([DAYS_PUBLISHED], SortMultipleOptions::default())
        .collect()?)
}

/// Running sums of the percentile band columns in ascending day order. The mean
/// is not carried. A missing entry stays missing and the total carries past it.
pub fn cumulative_view_curve(curve: &DataFrame) -> Result<DataFrame> {
    let mut columns = vec![col(DAYS_PUBLISHED)];
    columns.extend(BAND_COLUMNS.iter().map(|name| col(*name).cum_sum(false)));

    Ok(curve
        .clone()
        .lazy()
        .sort([DAYS_PUBLISHED], SortMultipleOptions::default())
        .select(columns)
        .collect()?)
}
