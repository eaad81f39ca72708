use channelscope_parser::dates::parse_duration_seconds;
use channelscope_parser::schema::{PUBLISH_TIME, VIEWS};
use polars::prelude::*;

use crate::columns::{f64_values, str_values};

pub const AVG_DURATION_SEC: &str = "avg_duration_sec";
pub const ENGAGEMENT_RATIO: &str = "engagement_ratio";
pub const VIEWS_PER_SUB_GAINED: &str = "views_per_sub_gained";

pub const DERIVED_COLUMNS: [&str; 3] = [AVG_DURATION_SEC, ENGAGEMENT_RATIO, VIEWS_PER_SUB_GAINED];

const ENGAGEMENT_COUNTERS: [&str; 4] = ["comments_added", "shares", "dislikes", "likes"];

/// Adds the per-video derived metrics and orders rows most recent first.
///
/// Zero denominators produce infinite or NaN ratios; they are kept as values.
/// Running this on its own output yields the same frame.
pub fn enrich_videos(videos: &DataFrame) -> PolarsResult<DataFrame> {
    let len = videos.height();

    let durations = str_values(videos, "average_view_duration")?;
    let counters = ENGAGEMENT_COUNTERS
        .iter()
        .map(|name| f64_values(videos, name))
        .collect::<PolarsResult<Vec<_>>>()?;
    let views = f64_values(videos, VIEWS)?;
    let subscribers_gained = f64_values(videos, "subscribers_gained")?;

    let mut avg_duration_sec = Vec::with_capacity(len);
    let mut engagement_ratio = Vec::with_capacity(len);
    let mut views_per_sub_gained = Vec::with_capacity(len);

    for idx in 0..len {
        avg_duration_sec.push(
            durations[idx]
                .as_deref()
                .and_then(|text| parse_duration_seconds(text).ok())
                .map(f64::from),
        );

        let interactions = counters
            .iter()
            .map(|column| column[idx])
            .sum::<Option<f64>>();
        engagement_ratio.push(match (interactions, views[idx]) {
            (Some(total), Some(views)) => Some(total / views),
            _ => None,
        });

        views_per_sub_gained.push(match (views[idx], subscribers_gained[idx]) {
            (Some(views), Some(gained)) => Some(views / gained),
            _ => None,
        });
    }

    let mut output = videos.clone();
    for name in DERIVED_COLUMNS {
        if output.column(name).is_ok() {
            output = output.drop(name)?;
        }
    }
    output.hstack_mut(&[
        Series::new(AVG_DURATION_SEC.into(), avg_duration_sec).into(),
        Series::new(ENGAGEMENT_RATIO.into(), engagement_ratio).into(),
        Series::new(VIEWS_PER_SUB_GAINED.into(), views_per_sub_gained).into(),
    ])?;

    output.sort(
        [PUBLISH_TIME],
        SortMultipleOptions::default()
            .with_order_descending(true)
            .with_maintain_order(true),
    )
}
