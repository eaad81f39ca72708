use std::fs;
use std::path::{Path, PathBuf};

use blake3::Hasher;
use channelscope_parser::formats::sources;
use channelscope_parser::{
    parse_country_subscribers, parse_daily_performance, parse_raw_table, parse_video_metrics,
    LoadOptions, RowWarning,
};
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

use crate::config::{LoadingConfig, SourceConfig};
use crate::error::{PipelineError, Result};

/// The in-memory contents of one source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub contents: String,
    pub fingerprint: SourceFingerprint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFingerprint {
    pub source_name: &'static str,
    pub path: String,
    pub bytes: u64,
    pub hash: String,
}

/// The four tables produced by one load.
#[derive(Debug, Clone)]
pub struct LoadedExports {
    pub videos: DataFrame,
    /// The per-video export read again without dropping its totals row or
    /// binding a schema. Nothing downstream reads it differently from
    /// `videos`; it is kept so the load surface matches the exports.
    pub comments: DataFrame,
    pub country_subscribers: DataFrame,
    pub daily: DataFrame,
    pub warnings: Vec<RowWarning>,
    pub fingerprints: Vec<SourceFingerprint>,
}

/// Reads a source file, rejecting anything above `max_bytes` before reading it.
pub fn read_source(source_name: &'static str, path: &Path, max_bytes: u64) -> Result<SourceFile> {
    let metadata = fs::metadata(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.len() > max_bytes {
        return Err(PipelineError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: max_bytes,
        });
    }

    let bytes = fs::read(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let fingerprint = SourceFingerprint {
        source_name,
        path: path.display().to_string(),
        bytes: bytes.len() as u64,
        hash: compute_hash(&bytes),
    };
    let contents = String::from_utf8(bytes).map_err(|_| PipelineError::NotUtf8 {
        path: path.to_path_buf(),
    })?;

    Ok(SourceFile {
        path: path.to_path_buf(),
        contents,
        fingerprint,
    })
}

pub fn load_exports(sources_config: &SourceConfig, loading: &LoadingConfig) -> Result<LoadedExports> {
    let limit = loading.max_file_bytes;
    let video_file = read_source(
        sources::VIDEO_METRICS,
        &sources_config.video_metrics_path(),
        limit,
    )?;
    let country_file = read_source(
        sources::COUNTRY_SUBSCRIBER,
        &sources_config.country_subscriber_path(),
        limit,
    )?;
    let daily_file = read_source(
        sources::DAILY_PERFORMANCE,
        &sources_config.daily_performance_path(),
        limit,
    )?;

    load_from_contents(
        &video_file,
        &country_file,
        &daily_file,
        &loading.load_options(),
    )
}

/// Parses already-read sources; any structural error aborts the whole load.
pub fn load_from_contents(
    video_file: &SourceFile,
    country_file: &SourceFile,
    daily_file: &SourceFile,
    options: &LoadOptions,
) -> Result<LoadedExports> {
    let videos = parse_video_metrics(&video_file.contents, options)?;
    info!(
        path = %video_file.path.display(),
        rows = videos.height(),
        skipped = videos.warnings.len(),
        "loaded per-video export"
    );

    let comments = parse_raw_table(&video_file.contents)?;

    let country_subscribers = parse_country_subscribers(&country_file.contents, options)?;
    info!(
        path = %country_file.path.display(),
        rows = country_subscribers.height(),
        skipped = country_subscribers.warnings.len(),
        "loaded country/subscriber export"
    );

    let daily = parse_daily_performance(&daily_file.contents, options)?;
    info!(
        path = %daily_file.path.display(),
        rows = daily.height(),
        skipped = daily.warnings.len(),
        "loaded daily performance export"
    );

    let mut warnings = videos.warnings;
    warnings.extend(country_subscribers.warnings);
    warnings.extend(daily.warnings);

    let mut comments_fingerprint = video_file.fingerprint.clone();
    comments_fingerprint.source_name = sources::COMMENTS;

    Ok(LoadedExports {
        videos: videos.df,
        comments,
        country_subscribers: country_subscribers.df,
        daily: daily.df,
        warnings,
        fingerprints: vec![
            video_file.fingerprint.clone(),
            comments_fingerprint,
            country_file.fingerprint.clone(),
            daily_file.fingerprint.clone(),
        ],
    })
}

fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    let hash = hasher.finalize();
    hash.to_hex().to_string()
}
