use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use polars::io::parquet::write::{ParquetCompression, ParquetWriter, StatisticsOptions};
use polars::prelude::DataFrame;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::pipeline::DashboardData;

pub fn write_parquet<W: Write>(df: &DataFrame, writer: W) -> Result<()> {
    let mut clone = df.clone();
    ParquetWriter::new(writer)
        .with_compression(ParquetCompression::Zstd(None))
        .with_statistics(StatisticsOptions::default())
        .finish(&mut clone)?;
    Ok(())
}

/// Writes the derived tables into `dir` as `<name>.parquet` and returns the paths written.
pub fn export_tables(data: &DashboardData, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let tables: [(&str, &DataFrame); 6] = [
        ("videos", &data.videos),
        ("delta_table", &data.delta_table),
        ("daily_aligned", &data.daily),
        ("cohort_curve", &data.cohort_curve),
        ("cumulative_curve", &data.cumulative_curve),
        ("country_subscribers", &data.country_subscribers),
    ];

    let mut written = Vec::with_capacity(tables.len());
    for (name, df) in tables {
        let path = dir.join(format!("{name}.parquet"));
        let file = File::create(&path).map_err(|source| PipelineError::Io {
            path: path.clone(),
            source,
        })?;
        write_parquet(df, file)?;
        info!(table = name, rows = df.height(), path = %path.display(), "wrote parquet table");
        written.push(path);
    }
    Ok(written)
}
