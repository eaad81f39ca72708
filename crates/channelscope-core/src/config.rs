use std::env;
use std::path::{Path, PathBuf};

use channelscope_parser::{LoadOptions, RowErrorPolicy};
use serde::Deserialize;

use crate::error::{PipelineError, Result};

pub const CONFIG_PATH_VAR: &str = "CHANNELSCOPE_CONFIG";
pub const DATA_DIR_VAR: &str = "CHANNELSCOPE_DATA_DIR";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub sources: SourceConfig,
    pub loading: LoadingConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub data_dir: PathBuf,
    pub video_metrics: String,
    pub country_subscriber: String,
    pub daily_performance: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            video_metrics: "Aggregated_Metrics_By_Video.csv".to_string(),
            country_subscriber: "Aggregated_Metrics_By_Country_And_Subscriber_Status.csv"
                .to_string(),
            daily_performance: "Video_Performance_Over_Time.csv".to_string(),
        }
    }
}

impl SourceConfig {
    pub fn video_metrics_path(&self) -> PathBuf {
        self.data_dir.join(&self.video_metrics)
    }

    pub fn country_subscriber_path(&self) -> PathBuf {
        self.data_dir.join(&self.country_subscriber)
    }

    pub fn daily_performance_path(&self) -> PathBuf {
        self.data_dir.join(&self.daily_performance)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    pub max_file_bytes: u64,
    pub row_errors: RowErrorPolicy,
    pub strict_headers: bool,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 64 * 1024 * 1024,
            row_errors: RowErrorPolicy::Abort,
            strict_headers: false,
        }
    }
}

impl LoadingConfig {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            row_errors: self.row_errors,
            strict_headers: self.strict_headers,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Window of the "recent" median on the metric cards.
    pub short_window_months: u32,
    /// Window of the reference median on the metric cards and of the delta table.
    pub long_window_months: u32,
    /// Publish window of the videos feeding the reference view curves.
    pub cohort_window_months: u32,
    pub curve_first_day: i64,
    pub curve_last_day: i64,
    pub upper_percentile: f64,
    pub lower_percentile: f64,
    pub display_metrics: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            short_window_months: 6,
            long_window_months: 12,
            cohort_window_months: 12,
            curve_first_day: 0,
            curve_last_day: 30,
            upper_percentile: 80.0,
            lower_percentile: 20.0,
            display_metrics: default_display_metrics(),
        }
    }
}

pub fn default_display_metrics() -> Vec<String> {
    [
        "views",
        "likes",
        "subscribers",
        "shares",
        "comments_added",
        "rpm_usd",
        "average_percent_viewed",
        "avg_duration_sec",
        "engagement_ratio",
        "views_per_sub_gained",
    ]
    .iter()
    .map(|name| name.to_string())
    .collect()
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.short_window_months == 0
            || self.long_window_months == 0
            || self.cohort_window_months == 0
        {
            return Err(PipelineError::Config(
                "window lengths must be at least one month".to_string(),
            ));
        }
        if self.curve_first_day > self.curve_last_day {
            return Err(PipelineError::Config(format!(
                "curve_first_day {} is after curve_last_day {}",
                self.curve_first_day, self.curve_last_day
            )));
        }
        let in_range = |p: f64| (0.0..=100.0).contains(&p);
        if !in_range(self.lower_percentile)
            || !in_range(self.upper_percentile)
            || self.lower_percentile > self.upper_percentile
        {
            return Err(PipelineError::Config(format!(
                "percentile band {}..{} must satisfy 0 <= lower <= upper <= 100",
                self.lower_percentile, self.upper_percentile
            )));
        }
        Ok(())
    }
}

impl DashboardConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DashboardConfig = toml::from_str(content)
            .map_err(|err| PipelineError::Config(format!("failed to parse config TOML: {err}")))?;
        config.analysis.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Reads the file named by `CHANNELSCOPE_CONFIG` (defaults otherwise), then
    /// applies `CHANNELSCOPE_DATA_DIR`.
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_PATH_VAR) {
            Some(path) => Self::from_path(Path::new(&path))?,
            None => Self::default(),
        };
        if let Some(dir) = env::var_os(DATA_DIR_VAR) {
            config.sources.data_dir = PathBuf::from(dir);
        }
        Ok(config)
    }
}
