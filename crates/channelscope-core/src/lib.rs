pub mod alignment;
pub mod baseline;
pub mod columns;
pub mod config;
pub mod enricher;
pub mod error;
pub mod ingestion;
pub mod outputs;
pub mod percentiles;
pub mod pipeline;
pub mod presentation;

pub use config::DashboardConfig;
pub use error::{PipelineError, Result};
pub use pipeline::DashboardData;
