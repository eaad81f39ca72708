// crates/channelscope-core/src/error.rs

use std::path::PathBuf;

use channelscope_parser::LoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is {size} bytes, above the {limit} byte limit")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("{path} is not valid UTF-8")]
    NotUtf8 { path: PathBuf },

    #[error("Export load failed: {0}")]
    Load(#[from] LoadError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No loaded video has the title '{0}'")]
    UnknownVideo(String),

    #[error("Invalid timestamp micros {0}")]
    InvalidTimestamp(i64),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
