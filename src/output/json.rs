//! JSON array artifact

use super::traits::{OutputResult, OutputSink};
use crate::pipeline::Identifier;
use std::path::PathBuf;

/// Writes identifiers to a file as one JSON array of strings
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputSink for JsonFileSink {
    /// Creates missing parent directories and replaces any existing file
    fn write(&self, identifiers: &[Identifier]) -> OutputResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string(identifiers)?;
        std::fs::write(&self.path, json)?;

        tracing::debug!(
            "Wrote {} identifiers to {}",
            identifiers.len(),
            self.path.display()
        );
        Ok(())
    }
}
