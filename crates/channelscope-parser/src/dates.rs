use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::errors::{DateAttempt, DateParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRule {
    pub label: &'static str,
    pub format: &'static str,
}

/// "January 5, 2023" first, then "Jan 5, 2023".
pub const PUBLISH_DATE_RULES: &[DateRule] = &[
    DateRule {
        label: "long_month_name",
        format: "%B %d, %Y",
    },
    DateRule {
        label: "short_month_name",
        format: "%b %d, %Y",
    },
];

/// "5 Jan 2023"; applied after [`normalize_month_abbreviation`].
pub const DAILY_DATE_RULES: &[DateRule] = &[
    DateRule {
        label: "day_short_month_year",
        format: "%d %b %Y",
    },
    DateRule {
        label: "day_long_month_year",
        format: "%d %B %Y",
    },
];

const DURATION_RULE: DateRule = DateRule {
    label: "clock_duration",
    format: "%H:%M:%S",
};

/// Evaluates `rules` in order and returns the first successful parse as midnight of that date.
pub fn parse_with_rules(value: &str, rules: &[DateRule]) -> Result<NaiveDateTime, DateParseError> {
    let trimmed = value.trim();
    let mut attempts = Vec::with_capacity(rules.len());

    for rule in rules {
        match NaiveDate::parse_from_str(trimmed, rule.format) {
            Ok(date) => return Ok(date.and_time(NaiveTime::MIN)),
            Err(err) => attempts.push(DateAttempt::new(rule.label, err.to_string())),
        }
    }

    Err(DateParseError {
        value: trimmed.to_string(),
        attempts,
    })
}

pub fn parse_publish_date(value: &str) -> Result<NaiveDateTime, DateParseError> {
    parse_with_rules(value, PUBLISH_DATE_RULES)
}

/// The daily export spells September both "Sep" and "Sept". Only the whole
/// "Sept" token is rewritten, so "September" is left alone.
pub fn normalize_month_abbreviation(value: &str) -> String {
    value
        .split_whitespace()
        .map(|token| if token == "Sept" { "Sep" } else { token })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_daily_date(value: &str) -> Result<NaiveDateTime, DateParseError> {
    parse_with_rules(&normalize_month_abbreviation(value), DAILY_DATE_RULES)
}

/// Total seconds of an `HH:MM:SS` duration.
///
/// The clock-time format tops out at 23 hours, so a 24h+ duration is rejected
/// rather than reinterpreted.
pub fn parse_duration_seconds(value: &str) -> Result<u32, DateParseError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, DURATION_RULE.format)
        .map(|time| time.second() + time.minute() * 60 + time.hour() * 3600)
        .map_err(|err| DateParseError {
            value: trimmed.to_string(),
            attempts: vec![DateAttempt::new(DURATION_RULE.label, err.to_string())],
        })
}

/// Microseconds since the epoch, the physical unit of every datetime column.
pub fn to_micros(value: NaiveDateTime) -> i64 {
    value.and_utc().timestamp_micros()
}

pub fn from_micros(micros: i64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp_micros(micros).map(|dt| dt.naive_utc())
}
