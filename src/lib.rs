//! Channel-Harvest: ranked channel identifier harvester
//!
//! This crate discovers ranked channel links from a paginated listing page,
//! visits each link with bounded concurrency, classifies the landing page and
//! extracts a stable channel identifier from it. The identifiers of a run are
//! collected into a single dataset and written as one JSON array.

pub mod config;
pub mod listing;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod url;

use thiserror::Error;

/// Main error type for Channel-Harvest operations
///
/// Failures of individual links never surface here; they are counted in the
/// run statistics instead.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Invalid run parameter: {0}")]
    Parameter(#[from] listing::ParameterError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Channel-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use listing::{Category, Concurrency, CountryCode, ListingSource, Metric, RunParameters};
pub use pipeline::{
    harvest, harvest_to_file, run_pipeline, Identifier, Link, ResolutionOutcome, RunReport,
};
pub use render::{HttpRenderer, Page, Renderer, StaticRenderer};
