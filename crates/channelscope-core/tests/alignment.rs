use channelscope_core::alignment::{align_daily_to_publish, restrict_to_cohort, DAYS_PUBLISHED};
use channelscope_core::columns::datetime_series;
use channelscope_core::percentiles::{
    cohort_view_curve, cumulative_view_curve, CurveSpec, LOWER_VIEWS, MEAN_VIEWS,
    MEDIAN_VIEWS, UPPER_VIEWS,
};
use channelscope_parser::dates::{parse_daily_date, parse_publish_date, to_micros};
use polars::prelude::*;

fn published(text: &str) -> Option<i64> {
    Some(to_micros(parse_publish_date(text).expect("publish date")))
}

fn observed(text: &str) -> Option<i64> {
    Some(to_micros(parse_daily_date(text).expect("daily date")))
}

fn videos() -> DataFrame {
    let mut df = df!(
        "video_id" => &["v1", "v2", "v3"],
        "video_title" => &["One", "Two", "Old"],
    )
    .unwrap();
    df.with_column(
        datetime_series(
            "publish_time",
            vec![
                published("Mar 1, 2023"),
                published("Feb 1, 2023"),
                published("Jan 5, 2021"),
            ],
        )
        .unwrap(),
    )
    .unwrap();
    df
}

fn daily(rows: &[(&str, &str, f64)]) -> DataFrame {
    let ids: Vec<&str> = rows.iter().map(|(id, _, _)| *id).collect();
    let views: Vec<f64> = rows.iter().map(|(_, _, views)| *views).collect();
    let dates = rows.iter().map(|(_, date, _)| observed(date)).collect();
    let mut df = df!(
        "external_video_id" => ids,
        "views" => views,
    )
    .unwrap();
    df.with_column(datetime_series("date", dates).unwrap())
        .unwrap();
    df
}

fn days(df: &DataFrame) -> Vec<Option<i64>> {
    df.column(DAYS_PUBLISHED)
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .collect()
}

fn floats(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .map(|value| value.expect("non-null"))
        .collect()
}

#[test]
fn unmatched_rows_are_dropped() {
    let daily = daily(&[
        ("v1", "1 Mar 2023", 10.0),
        ("missing", "1 Mar 2023", 99.0),
        ("v2", "3 Feb 2023", 7.0),
    ]);

    let aligned = align_daily_to_publish(&daily, &videos()).expect("aligned");
    assert_eq!(aligned.height(), 2);
    assert!(days(&aligned).iter().all(Option::is_some));
    assert_eq!(days(&aligned), vec![Some(0), Some(2)]);
}

#[test]
fn observation_before_publish_keeps_negative_day() {
    let daily = daily(&[("v1", "27 Feb 2023", 4.0), ("v1", "28 Feb 2023", 5.0)]);

    let aligned = align_daily_to_publish(&daily, &videos()).expect("aligned");
    assert_eq!(days(&aligned), vec![Some(-2), Some(-1)]);

    let curve = cohort_view_curve(&aligned, &CurveSpec::default()).expect("curve");
    assert_eq!(curve.height(), 0);
}

#[test]
fn cohort_excludes_old_videos() {
    let daily = daily(&[
        ("v1", "1 Mar 2023", 10.0),
        ("v3", "5 Jan 2021", 500.0),
    ]);

    let aligned = align_daily_to_publish(&daily, &videos()).expect("aligned");
    let cohort = restrict_to_cohort(&aligned, &videos(), 12).expect("cohort");

    assert_eq!(aligned.height(), 2);
    assert_eq!(cohort.height(), 1);
    assert_eq!(floats(&cohort, "views"), vec![10.0]);
}

#[test]
fn curve_percentiles_are_ordered() {
    let daily = daily(&[
        ("v1", "1 Mar 2023", 100.0),
        ("v2", "1 Feb 2023", 300.0),
        ("v1", "2 Mar 2023", 50.0),
        ("v2", "2 Feb 2023", 80.0),
        ("v1", "3 Mar 2023", 30.0),
        ("v1", "31 Mar 2023", 1.0),
        ("v1", "1 Apr 2023", 1000.0),
    ]);

    let aligned = align_daily_to_publish(&daily, &videos()).expect("aligned");
    let curve = cohort_view_curve(&aligned, &CurveSpec::default()).expect("curve");

    // Day 31 lies outside the default range.
    assert_eq!(days(&curve), vec![Some(0), Some(1), Some(2), Some(30)]);

    let lower = floats(&curve, LOWER_VIEWS);
    let median = floats(&curve, MEDIAN_VIEWS);
    let upper = floats(&curve, UPPER_VIEWS);
    for idx in 0..curve.height() {
        assert!(lower[idx] <= median[idx]);
        assert!(median[idx] <= upper[idx]);
    }

    assert!((median[0] - 200.0).abs() < 1e-9);
    assert!((upper[0] - 260.0).abs() < 1e-9);
    assert!((lower[0] - 140.0).abs() < 1e-9);
    assert!((floats(&curve, MEAN_VIEWS)[1] - 65.0).abs() < 1e-9);
}

#[test]
fn cumulative_bands_never_decrease() {
    let daily = daily(&[
        ("v1", "1 Mar 2023", 100.0),
        ("v2", "1 Feb 2023", 300.0),
        ("v1", "2 Mar 2023", 50.0),
        ("v2", "2 Feb 2023", 0.0),
        ("v1", "4 Mar 2023", 30.0),
    ]);

    let aligned = align_daily_to_publish(&daily, &videos()).expect("aligned");
    let curve = cohort_view_curve(&aligned, &CurveSpec::default()).expect("curve");
    let cumulative = cumulative_view_curve(&curve).expect("cumulative");

    assert_eq!(cumulative.width(), 4);
    assert!(cumulative.column(MEAN_VIEWS).is_err());
    for name in [LOWER_VIEWS, MEDIAN_VIEWS, UPPER_VIEWS] {
        let values = floats(&cumulative, name);
        assert!(values.windows(2).all(|pair| pair[0] <= pair[1]), "{name}");
    }
    assert_eq!(floats(&cumulative, MEDIAN_VIEWS), vec![200.0, 225.0, 255.0]);
}

#[test]
fn cumulative_curve_carries_past_missing_days() {
    let curve = df!(
        "days_published" => &[0i64, 1, 2, 3],
        "mean_views" => &[100.0f64, 0.0, 30.0, 20.0],
        "median_views" => &[Some(100.0f64), None, Some(30.0), Some(20.0)],
        "pct80_views" => &[120.0f64, 10.0, 40.0, 25.0],
        "pct20_views" => &[80.0f64, 0.0, 20.0, 15.0],
    )
    .unwrap();

    let cumulative = cumulative_view_curve(&curve).expect("cumulative");
    let median: Vec<_> = cumulative
        .column(MEDIAN_VIEWS)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(median, vec![Some(100.0), None, Some(130.0), Some(150.0)]);
    assert_eq!(floats(&cumulative, UPPER_VIEWS), vec![120.0, 130.0, 170.0, 195.0]);
}

#[test]
fn single_observation_is_every_percentile() {
    let daily = daily(&[("v1", "2 Mar 2023", 7.0)]);
    let aligned = align_daily_to_publish(&daily, &videos()).expect("aligned");
    let curve = cohort_view_curve(&aligned, &CurveSpec::default()).expect("curve");

    for name in [MEAN_VIEWS, MEDIAN_VIEWS, UPPER_VIEWS, LOWER_VIEWS] {
        assert_eq!(floats(&curve, name), vec![7.0], "{name}");
    }
}
