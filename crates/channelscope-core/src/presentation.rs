//! Fixed-shape tables handed to whatever renders the dashboard.

use channelscope_parser::schema::{
    EXTERNAL_VIDEO_ID, IS_SUBSCRIBED, PUBLISH_TIME, VIDEO_ID, VIDEO_TITLE, VIEWS,
};
use polars::prelude::*;

use crate::alignment::DAYS_PUBLISHED;
use crate::baseline::MetricComparison;
use crate::columns::str_values;
use crate::error::{PipelineError, Result};
use crate::pipeline::DashboardData;

pub const PUBLISH_DATE: &str = "publish_date";
pub const CUMULATIVE_VIEWS: &str = "cumulative_views";

#[derive(Debug, Clone)]
pub struct AggregateView {
    pub comparisons: Vec<MetricComparison>,
    /// Publish date, title and the display metrics, relative to the trailing median.
    pub table: DataFrame,
}

#[derive(Debug, Clone)]
pub struct VideoView {
    pub title: String,
    /// The video's country rows, non-subscribers first.
    pub country_subscribers: DataFrame,
    /// Cumulative median and percentile band of the reference cohort.
    pub reference_curve: DataFrame,
    /// The video's own `days_published`, `views` and `cumulative_views`, ascending by day.
    pub trajectory: DataFrame,
}

impl DashboardData {
    pub fn video_titles(&self) -> Result<Vec<String>> {
        Ok(str_values(&self.videos, VIDEO_TITLE)?
            .into_iter()
            .flatten()
            .collect())
    }

    pub fn aggregate_view(&self) -> Result<AggregateView> {
        let mut exprs = vec![
            col(PUBLISH_TIME).cast(DataType::Date).alias(PUBLISH_DATE),
            col(VIDEO_TITLE),
        ];
        exprs.extend(
            self.display_metrics
                .iter()
                .map(|metric| col(metric.as_str())),
        );
        let table = self.delta_table.clone().lazy().select(exprs).collect()?;

        Ok(AggregateView {
            comparisons: self.comparisons.clone(),
            table,
        })
    }

    /// Views of the most recent video with this title. Its rows are selected by
    /// video id, so an older upload sharing the title is not mixed in.
    pub fn video_view(&self, title: &str) -> Result<VideoView> {
        let video_id = self.video_id_for_title(title)?;

        let belongs = match self.country_subscribers.column(EXTERNAL_VIDEO_ID) {
            Ok(_) => col(EXTERNAL_VIDEO_ID).eq(lit(video_id.clone())),
            Err(_) => col(VIDEO_TITLE).eq(lit(title)),
        };
        let country_subscribers = self
            .country_subscribers
            .clone()
            .lazy()
            .filter(belongs)
            .sort(
                [IS_SUBSCRIBED],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()?;

        let trajectory = self
            .daily
            .clone()
            .lazy()
            .filter(
                col(EXTERNAL_VIDEO_ID)
                    .eq(lit(video_id))
                    .and(self.curve_spec.day_range()),
            )
            .select([col(DAYS_PUBLISHED), col(VIEWS)])
            .sort(
                [DAYS_PUBLISHED],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .with_column(col(VIEWS).cum_sum(false).alias(CUMULATIVE_VIEWS))
            .collect()?;

        Ok(VideoView {
            title: title.to_string(),
            country_subscribers,
            reference_curve: self.cumulative_curve.clone(),
            trajectory,
        })
    }

    /// `videos` is most recent first, so the first match is the latest upload.
    fn video_id_for_title(&self, title: &str) -> Result<String> {
        let titles = str_values(&self.videos, VIDEO_TITLE)?;
        let ids = str_values(&self.videos, VIDEO_ID)?;
        titles
            .into_iter()
            .zip(ids)
            .find_map(|(candidate, id)| match (candidate, id) {
                (Some(candidate), Some(id)) if candidate == title => Some(id),
                _ => None,
            })
            .ok_or_else(|| PipelineError::UnknownVideo(title.to_string()))
    }
}

/// `0.5` renders as `"50.0%"`; infinite or NaN deltas render as `"N/A"`.
pub fn format_percent(delta: f64) -> String {
    if delta.is_finite() {
        format!("{:.1}%", delta * 100.0)
    } else {
        "N/A".to_string()
    }
}

pub fn format_metric(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "N/A".to_string()
    }
}
