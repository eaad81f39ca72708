pub mod dates;
pub mod errors;
pub mod formats;
pub mod model;

pub use errors::{DateAttempt, DateParseError, LoadError};
pub use formats::schema;
pub use formats::{
    parse_country_subscribers, parse_daily_performance, parse_raw_table, parse_video_metrics,
};
pub use model::{LoadOptions, ParsedTable, RowErrorPolicy, RowWarning};
