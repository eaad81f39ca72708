use channelscope_parser::schema::{DATE, EXTERNAL_VIDEO_ID, PUBLISH_TIME, VIDEO_ID};
use polars::prelude::*;
use tracing::debug;

use crate::baseline::window_cutoff;
use crate::error::Result;

pub const DAYS_PUBLISHED: &str = "days_published";

const MICROS_PER_DAY: i64 = 24 * 60 * 60 * 1_000_000;
const ROW_ORDER: &str = "__row_order";

/// Inner-joins daily rows to their video on `external_video_id == video_id`,
/// adding `publish_time` and `days_published` (floored whole days, negative
/// when the observation predates the publish time). Rows without a matching
/// video are dropped. Input row order is kept.
pub fn align_daily_to_publish(daily: &DataFrame, videos: &DataFrame) -> Result<DataFrame> {
    let publish = videos
        .clone()
        .lazy()
        .select([col(VIDEO_ID), col(PUBLISH_TIME)]);

    let aligned = daily
        .clone()
        .lazy()
        .with_row_index(ROW_ORDER, None)
        .join(
            publish,
            [col(EXTERNAL_VIDEO_ID)],
            [col(VIDEO_ID)],
            JoinArgs::new(JoinType::Inner),
        )
        .with_column(
            (col(DATE).cast(DataType::Int64) - col(PUBLISH_TIME).cast(DataType::Int64))
                .floor_div(lit(MICROS_PER_DAY))
                .alias(DAYS_PUBLISHED),
        )
        .filter(col(DAYS_PUBLISHED).is_not_null())
        .sort([ROW_ORDER], SortMultipleOptions::default())
        .collect()?
        .drop(ROW_ORDER)?;

    let dropped = daily.height().saturating_sub(aligned.height());
    if dropped > 0 {
        debug!(dropped, "daily rows without a matching video dropped");
    }

    Ok(aligned)
}

/// Keeps aligned rows whose video was published within `months` of the latest publish time.
pub fn restrict_to_cohort(aligned: &DataFrame, videos: &DataFrame, months: u32) -> Result<DataFrame> {
    let Some(cutoff) = window_cutoff(videos, months)? else {
        return Ok(aligned.clear());
    };
    Ok(aligned
        .clone()
        .lazy()
        .filter(col(PUBLISH_TIME).cast(DataType::Int64).gt_eq(lit(cutoff)))
        .collect()?)
}
