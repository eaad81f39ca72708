use channelscope_parser::RowWarning;
use polars::prelude::DataFrame;
use tracing::info;

use crate::alignment::{align_daily_to_publish, restrict_to_cohort};
use crate::baseline::{
    compare_windows, numeric_columns, relative_delta_table, trailing_window_medians,
    BaselineMedians, MetricComparison,
};
use crate::config::AnalysisConfig;
use crate::enricher::enrich_videos;
use crate::error::Result;
use crate::ingestion::{LoadedExports, SourceFingerprint};
use crate::percentiles::{cohort_view_curve, cumulative_view_curve, CurveSpec};

/// Everything derived from one load. Built once, then only read.
#[derive(Debug, Clone)]
pub struct DashboardData {
    /// Enriched per-video table, most recent first.
    pub videos: DataFrame,
    pub comments: DataFrame,
    pub country_subscribers: DataFrame,
    /// Daily rows joined to their video, with `days_published`.
    pub daily: DataFrame,
    /// `videos` with every numeric column relative to `delta_baseline`.
    pub delta_table: DataFrame,
    pub delta_baseline: BaselineMedians,
    pub comparisons: Vec<MetricComparison>,
    pub cohort_curve: DataFrame,
    pub cumulative_curve: DataFrame,
    pub warnings: Vec<RowWarning>,
    pub fingerprints: Vec<SourceFingerprint>,
    pub display_metrics: Vec<String>,
    pub curve_spec: CurveSpec,
}

impl DashboardData {
    pub fn build(exports: LoadedExports, config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let videos = enrich_videos(&exports.videos)?;

        let delta_columns = numeric_columns(&videos);
        let delta_baseline =
            trailing_window_medians(&videos, config.long_window_months, &delta_columns)?;
        let delta_table = relative_delta_table(&videos, &delta_baseline)?;
        let comparisons = compare_windows(
            &videos,
            config.short_window_months,
            config.long_window_months,
            &config.display_metrics,
        )?;
        info!(
            cohort = delta_baseline.cohort_size,
            columns = delta_columns.len(),
            "computed trailing-window baselines"
        );

        let daily = align_daily_to_publish(&exports.daily, &videos)?;
        let cohort = restrict_to_cohort(&daily, &videos, config.cohort_window_months)?;
        let curve_spec = CurveSpec {
            first_day: config.curve_first_day,
            last_day: config.curve_last_day,
            upper_percentile: config.upper_percentile,
            lower_percentile: config.lower_percentile,
        };
        let cohort_curve = cohort_view_curve(&cohort, &curve_spec)?;
        let cumulative_curve = cumulative_view_curve(&cohort_curve)?;
        info!(
            aligned_rows = daily.height(),
            cohort_rows = cohort.height(),
            curve_days = cohort_curve.height(),
            "computed cohort view curves"
        );

        Ok(Self {
            videos,
            comments: exports.comments,
            country_subscribers: exports.country_subscribers,
            daily,
            delta_table,
            delta_baseline,
            comparisons,
            cohort_curve,
            cumulative_curve,
            warnings: exports.warnings,
            fingerprints: exports.fingerprints,
            display_metrics: config.display_metrics.clone(),
            curve_spec,
        })
    }
}
