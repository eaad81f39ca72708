use std::path::PathBuf;

use channelscope_core::columns::datetime_series;
use channelscope_core::config::{AnalysisConfig, LoadingConfig, SourceConfig};
use channelscope_core::ingestion::{load_exports, LoadedExports};
use channelscope_core::outputs::{export_tables, write_parquet};
use channelscope_core::percentiles::{LOWER_VIEWS, MEDIAN_VIEWS, UPPER_VIEWS};
use channelscope_core::presentation::{format_percent, CUMULATIVE_VIEWS, PUBLISH_DATE};
use channelscope_core::{DashboardData, PipelineError};
use channelscope_parser::dates::{parse_daily_date, parse_publish_date, to_micros};
use polars::prelude::*;

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../channelscope-parser/tests/data")
}

fn dashboard() -> DashboardData {
    let sources = SourceConfig {
        data_dir: fixture_dir(),
        ..SourceConfig::default()
    };
    let exports = load_exports(&sources, &LoadingConfig::default()).expect("load fixtures");
    DashboardData::build(exports, &AnalysisConfig::default()).expect("build dashboard")
}

fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

fn assert_close(actual: &[Option<f64>], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (actual, expected) in actual.iter().zip(expected) {
        let actual = actual.expect("non-null");
        assert!((actual - expected).abs() < 1e-9, "{actual} vs {expected}");
    }
}

#[test]
fn builds_from_fixture_exports() {
    let data = dashboard();

    assert_eq!(data.videos.height(), 5);
    assert_eq!(data.comments.height(), 6);
    assert_eq!(data.country_subscribers.height(), 5);
    assert!(data.warnings.is_empty());
    assert_eq!(data.fingerprints.len(), 4);
    assert!(data.fingerprints.iter().all(|print| print.hash.len() == 64));

    // vid999 has no video row.
    assert_eq!(data.daily.height(), 10);
    assert_eq!(data.delta_baseline.cohort_size, 4);
    assert_eq!(data.delta_baseline.get("views"), Some(2500.0));

    assert_eq!(
        data.video_titles().expect("titles"),
        vec![
            "Rust in Production",
            "Parsing CSV Fast",
            "Polars Deep Dive",
            "Async Explained",
            "Old Favourite",
        ]
    );
}

#[test]
fn cohort_curve_matches_fixture() {
    let data = dashboard();

    let days: Vec<_> = data
        .cohort_curve
        .column("days_published")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(days, vec![0, 1, 2, 3]);

    assert_close(&floats(&data.cohort_curve, MEDIAN_VIEWS), &[200.0, 80.0, 30.0, 20.0]);
    assert_close(&floats(&data.cumulative_curve, MEDIAN_VIEWS), &[200.0, 280.0, 310.0, 330.0]);
    assert_close(&floats(&data.cumulative_curve, UPPER_VIEWS), &[260.0, 346.0, 376.0, 396.0]);
    assert_close(&floats(&data.cumulative_curve, LOWER_VIEWS), &[140.0, 202.0, 232.0, 252.0]);
}

#[test]
fn aggregate_view_compares_windows() {
    let data = dashboard();
    let view = data.aggregate_view().expect("aggregate view");

    let views = view
        .comparisons
        .iter()
        .find(|card| card.metric == "views")
        .expect("views card");
    assert_eq!(views.short_window_median, 2000.0);
    assert_eq!(views.long_window_median, 2500.0);
    assert_eq!(format_percent(views.delta), "-20.0%");

    assert_eq!(view.table.height(), 5);
    assert_eq!(view.table.width(), 2 + data.display_metrics.len());
    assert_eq!(view.table.column(PUBLISH_DATE).unwrap().dtype(), &DataType::Date);
    assert_close(&floats(&view.table, "views")[..1], &[-0.6]);
}

#[test]
fn video_view_for_known_title() {
    let data = dashboard();
    let view = data.video_view("Rust in Production").expect("video view");

    let subscribed: Vec<_> = view
        .country_subscribers
        .column("is_subscribed")
        .unwrap()
        .bool()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(subscribed, vec![false, false, true, true]);
    assert_close(
        &floats(&view.country_subscribers, "views"),
        &[200.0, 50.0, 300.0, 100.0],
    );

    // The 28 Feb observation is day -1 and falls outside the curve.
    assert_close(&floats(&view.trajectory, "views"), &[100.0, 50.0, 30.0, 20.0]);
    assert_close(
        &floats(&view.trajectory, CUMULATIVE_VIEWS),
        &[100.0, 150.0, 180.0, 200.0],
    );
    assert_eq!(view.reference_curve.height(), 4);
}

#[test]
fn unknown_title_is_rejected() {
    let data = dashboard();
    let err = data.video_view("Never Uploaded").unwrap_err();
    assert!(matches!(err, PipelineError::UnknownVideo(title) if title == "Never Uploaded"));
}

#[test]
fn parquet_export_writes_every_table() {
    let data = dashboard();

    let mut buffer = Vec::new();
    write_parquet(&data.cumulative_curve, &mut buffer).expect("write parquet");
    assert!(buffer.starts_with(b"PAR1"));

    let dir = std::env::temp_dir().join(format!("channelscope-export-{}", std::process::id()));
    let written = export_tables(&data, &dir).expect("export tables");
    assert_eq!(written.len(), 6);
    for path in &written {
        let size = std::fs::metadata(path).expect("exported file").len();
        assert!(size > 0, "{}", path.display());
    }
    std::fs::remove_dir_all(&dir).expect("clean up export dir");
}

fn reupload_exports() -> LoadedExports {
    let mut videos = df!(
        "video_id" => &["new", "old"],
        "video_title" => &["Weekly Update", "Weekly Update"],
        "comments_added" => &[1.0f64, 1.0],
        "shares" => &[1.0f64, 1.0],
        "dislikes" => &[1.0f64, 1.0],
        "likes" => &[1.0f64, 1.0],
        "subscribers_gained" => &[1.0f64, 1.0],
        "average_view_duration" => &["0:01:00", "0:01:00"],
        "views" => &[100.0f64, 900.0],
    )
    .unwrap();
    let publish = ["Mar 1, 2023", "Feb 1, 2023"]
        .iter()
        .map(|text| Some(to_micros(parse_publish_date(text).unwrap())))
        .collect();
    videos
        .with_column(datetime_series("publish_time", publish).unwrap())
        .unwrap();

    let mut daily = df!(
        "external_video_id" => &["old", "new", "old", "new"],
        "video_title" => &["Weekly Update"; 4],
        "views" => &[500.0f64, 10.0, 300.0, 5.0],
    )
    .unwrap();
    let dates = ["1 Feb 2023", "1 Mar 2023", "2 Feb 2023", "2 Mar 2023"]
        .iter()
        .map(|text| Some(to_micros(parse_daily_date(text).unwrap())))
        .collect();
    daily
        .with_column(datetime_series("date", dates).unwrap())
        .unwrap();

    let country_subscribers = df!(
        "video_title" => &["Weekly Update", "Weekly Update"],
        "country_code" => &["US", "US"],
        "is_subscribed" => &[true, true],
        "views" => &[100.0f64, 900.0],
        "external_video_id" => &["new", "old"],
    )
    .unwrap();

    LoadedExports {
        comments: videos.clone(),
        videos,
        country_subscribers,
        daily,
        warnings: Vec::new(),
        fingerprints: Vec::new(),
    }
}

#[test]
fn shared_title_selects_the_latest_upload_only() {
    let config = AnalysisConfig {
        display_metrics: vec!["views".to_string()],
        ..AnalysisConfig::default()
    };
    let data = DashboardData::build(reupload_exports(), &config).expect("build dashboard");
    let view = data.video_view("Weekly Update").expect("video view");

    assert_close(&floats(&view.trajectory, "views"), &[10.0, 5.0]);
    assert_close(&floats(&view.trajectory, CUMULATIVE_VIEWS), &[10.0, 15.0]);
    assert_close(&floats(&view.country_subscribers, "views"), &[100.0]);

    // Both uploads still feed the reference curve.
    assert_close(&floats(&data.cohort_curve, MEDIAN_VIEWS), &[255.0, 152.5]);
}
