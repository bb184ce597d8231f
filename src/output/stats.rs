//! Run statistics
//!
//! This module records what happened during a run and reports it once the
//! run is over.

use crate::pipeline::{BatchReport, FailureKind};
use std::collections::BTreeMap;
use std::time::Duration;

/// Run statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    /// Wrapper elements inspected on the listing page
    pub links_examined: usize,

    /// Listing entries dropped during discovery
    pub links_dropped: usize,

    /// Links handed to the scheduler (after the cap)
    pub links_scheduled: usize,

    /// Batches executed
    pub batches: usize,

    /// Links that resolved to an identifier
    pub resolved: usize,

    /// Failed links by failure kind
    pub failures: BTreeMap<FailureKind, usize>,

    /// Why the listing page could not be used, if it could not
    pub listing_error: Option<String>,

    /// Wall time of discovery and resolution
    pub elapsed: Duration,
}

impl RunStatistics {
    /// Adds a settled batch to the totals
    pub fn record_batch(&mut self, batch: &BatchReport) {
        self.batches += 1;
        self.resolved += batch.resolved;
        for kind in &batch.failures {
            *self.failures.entry(*kind).or_insert(0) += 1;
        }
    }

    /// Links that did not resolve
    pub fn failed(&self) -> usize {
        self.failures.values().sum()
    }

    /// Share of scheduled links that resolved, in percent
    pub fn success_rate(&self) -> f64 {
        if self.links_scheduled > 0 {
            (self.resolved as f64 / self.links_scheduled as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Logs the statistics of a finished run
///
/// # Arguments
///
/// * `stats` - The statistics to report
pub fn log_statistics(stats: &RunStatistics) {
    if let Some(error) = &stats.listing_error {
        tracing::warn!("Listing unavailable, nothing was resolved: {}", error);
    }

    tracing::info!(
        "Discovery: {} entries examined, {} dropped, {} scheduled",
        stats.links_examined,
        stats.links_dropped,
        stats.links_scheduled
    );

    tracing::info!(
        "Resolution: {} resolved, {} failed in {} batches ({:.1}% success, {:.1?})",
        stats.resolved,
        stats.failed(),
        stats.batches,
        stats.success_rate(),
        stats.elapsed
    );

    for (kind, count) in &stats.failures {
        tracing::info!("  {}: {}", kind.as_str(), count);
    }
}
