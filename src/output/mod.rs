//! Output module for persisting harvest results
//!
//! This module handles:
//! - Naming the artifact of a run from its parameters and start time
//! - Writing the resolved identifiers as a single JSON array
//! - Recording and reporting run statistics

mod json;
mod path;
pub mod stats;
mod traits;

pub use json::JsonFileSink;
pub use path::{artifact_path, format_stamp};
pub use stats::{log_statistics, RunStatistics};
pub use traits::{OutputError, OutputResult, OutputSink};
