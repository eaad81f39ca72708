use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use channelscope_core::alignment::DAYS_PUBLISHED;
use channelscope_core::ingestion::load_exports;
use channelscope_core::outputs::export_tables;
use channelscope_core::percentiles::{LOWER_VIEWS, MEDIAN_VIEWS, UPPER_VIEWS};
use channelscope_core::presentation::{format_metric, format_percent, CUMULATIVE_VIEWS};
use channelscope_core::{DashboardConfig, DashboardData};
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use polars::prelude::{AnyValue, DataFrame};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Channel performance dashboard over exported analytics tables", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to $CHANNELSCOPE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the exported CSV files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Row counts, load warnings and source fingerprints
    Summary,
    /// Recent-vs-reference metric cards and the per-video delta table
    Aggregate(AggregateArgs),
    /// List loaded video titles, most recent first
    Videos,
    /// Country/subscriber split and view trajectory of one video
    Video(VideoArgs),
    /// Write the derived tables as Parquet
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
struct AggregateArgs {
    /// Show only the first N videos of the delta table
    #[arg(long)]
    limit: Option<usize>,
    /// Print the metric cards as JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct VideoArgs {
    /// Exact video title
    title: String,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Output directory
    #[arg(long)]
    out: PathBuf,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let exports = load_exports(&config.sources, &config.loading).with_context(|| {
        format!(
            "failed to load exports from {}",
            config.sources.data_dir.display()
        )
    })?;
    let data = DashboardData::build(exports, &config.analysis)
        .context("failed to derive dashboard tables")?;
    for warning in &data.warnings {
        warn!(%warning, "row skipped during load");
    }

    match cli.command {
        Command::Summary => print_summary(&data),
        Command::Aggregate(args) => print_aggregate(&data, &args),
        Command::Videos => {
            for (idx, title) in data.video_titles()?.iter().enumerate() {
                println!("{:>3}  {title}", idx + 1);
            }
            Ok(())
        }
        Command::Video(args) => print_video(&data, &args.title),
        Command::Export(args) => {
            let written = export_tables(&data, &args.out)
                .with_context(|| format!("failed to export to {}", args.out.display()))?;
            info!(files = written.len(), "export complete");
            for path in written {
                println!("{}", path.display());
            }
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_path(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => DashboardConfig::from_env().context("failed to read configuration")?,
    };
    if let Some(dir) = &cli.data_dir {
        config.sources.data_dir = dir.clone();
    }
    Ok(config)
}

fn print_summary(data: &DashboardData) -> Result<()> {
    let mut counts = Table::new();
    counts.load_preset(UTF8_FULL).set_header(vec!["table", "rows"]);
    for (name, df) in [
        ("videos", &data.videos),
        ("comments", &data.comments),
        ("country_subscribers", &data.country_subscribers),
        ("daily_aligned", &data.daily),
        ("cohort_curve", &data.cohort_curve),
    ] {
        counts.add_row(vec![name.to_string(), df.height().to_string()]);
    }
    println!("{counts}");

    let mut sources = Table::new();
    sources
        .load_preset(UTF8_FULL)
        .set_header(vec!["source", "path", "bytes", "blake3"]);
    for print in &data.fingerprints {
        sources.add_row(vec![
            print.source_name.to_string(),
            print.path.clone(),
            print.bytes.to_string(),
            print.hash.clone(),
        ]);
    }
    println!("{sources}");

    if data.warnings.is_empty() {
        println!("No rows skipped.");
    } else {
        println!("{} rows skipped:", data.warnings.len());
        for warning in &data.warnings {
            println!("  {warning}");
        }
    }
    Ok(())
}

fn print_aggregate(data: &DashboardData, args: &AggregateArgs) -> Result<()> {
    let view = data.aggregate_view()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view.comparisons)?);
        return Ok(());
    }

    let mut cards = Table::new();
    cards
        .load_preset(UTF8_FULL)
        .set_header(vec!["metric", "recent median", "reference median", "change"]);
    for card in &view.comparisons {
        cards.add_row(vec![
            card.metric.clone(),
            format_metric(card.short_window_median),
            format_metric(card.long_window_median),
            format_percent(card.delta),
        ]);
    }
    println!("{cards}");

    let rows = args.limit.unwrap_or(view.table.height());
    println!("{}", frame_table(&view.table, rows, format_percent)?);
    Ok(())
}

fn print_video(data: &DashboardData, title: &str) -> Result<()> {
    let view = data.video_view(title)?;

    println!("{}", frame_table(&view.country_subscribers, usize::MAX, format_metric)?);

    let own: HashMap<i64, Option<f64>> = view
        .trajectory
        .column(DAYS_PUBLISHED)?
        .i64()?
        .into_iter()
        .zip(view.trajectory.column(CUMULATIVE_VIEWS)?.f64()?.into_iter())
        .filter_map(|(day, total)| day.map(|day| (day, total)))
        .collect();

    let reference = &view.reference_curve;
    let days = reference.column(DAYS_PUBLISHED)?.i64()?;
    let median = reference.column(MEDIAN_VIEWS)?.f64()?;
    let upper = reference.column(UPPER_VIEWS)?.f64()?;
    let lower = reference.column(LOWER_VIEWS)?.f64()?;

    let mut curve = Table::new();
    curve.load_preset(UTF8_FULL).set_header(vec![
        "day",
        "median",
        "80th percentile",
        "20th percentile",
        "this video",
    ]);
    let cell = |value: Option<f64>| value.map(format_metric).unwrap_or_default();
    for idx in 0..reference.height() {
        let Some(day) = days.get(idx) else {
            continue;
        };
        curve.add_row(vec![
            day.to_string(),
            cell(median.get(idx)),
            cell(upper.get(idx)),
            cell(lower.get(idx)),
            cell(own.get(&day).copied().flatten()),
        ]);
    }
    println!("{curve}");
    Ok(())
}

fn frame_table(df: &DataFrame, rows: usize, float: fn(f64) -> String) -> Result<Table> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(
        df.get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>(),
    );

    for idx in 0..df.height().min(rows) {
        let mut row = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let text = match column.get(idx)? {
                AnyValue::Null => String::new(),
                AnyValue::Float64(value) => float(value),
                AnyValue::String(value) => value.to_string(),
                AnyValue::StringOwned(value) => value.to_string(),
                other => other.to_string(),
            };
            row.push(text);
        }
        table.add_row(row);
    }
    Ok(table)
}
