mod common;
mod country_subscriber;
mod daily_performance;
mod raw_table;
pub mod schema;
mod video_metrics;

pub use country_subscriber::parse_country_subscribers;
pub use daily_performance::parse_daily_performance;
pub use raw_table::parse_raw_table;
pub use video_metrics::parse_video_metrics;

pub mod sources {
    pub use super::country_subscriber::SOURCE_NAME as COUNTRY_SUBSCRIBER;
    pub use super::daily_performance::SOURCE_NAME as DAILY_PERFORMANCE;
    pub use super::raw_table::SOURCE_NAME as COMMENTS;
    pub use super::video_metrics::SOURCE_NAME as VIDEO_METRICS;
}
