//! Batch scheduler for link resolution
//!
//! This module handles:
//! - Partitioning the discovered links into near-equal batches
//! - Resolving every link of a batch concurrently
//! - Holding the next batch back until every task of the current one settled

use super::{Link, ResolutionOutcome};
use crate::pipeline::resolver::FailureKind;
use futures::future::join_all;
use std::future::Future;

/// Size of each batch for `total` items at a target concurrency
///
/// Returns `ceil(total / concurrency)`, or 0 when there is nothing to do.
pub fn batch_size(total: usize, concurrency: usize) -> usize {
    if total == 0 {
        return 0;
    }
    total.div_ceil(concurrency.max(1))
}

/// Splits `items` into consecutive batches of [`batch_size`] items
///
/// The last batch may be shorter. Zero items yield zero batches.
pub fn plan_batches<T>(items: Vec<T>, concurrency: usize) -> Vec<Vec<T>> {
    let size = batch_size(items.len(), concurrency);
    if size == 0 {
        return Vec::new();
    }

    let mut batches = Vec::with_capacity(items.len().div_ceil(size));
    let mut items = items.into_iter().peekable();
    while items.peek().is_some() {
        batches.push(items.by_ref().take(size).collect());
    }
    batches
}

/// Tally of one settled batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Position of the batch, starting at 0
    pub index: usize,

    /// Links dispatched in the batch
    pub size: usize,

    /// Links that resolved to an identifier
    pub resolved: usize,

    /// Failure kind of every link that did not resolve
    pub failures: Vec<FailureKind>,
}

/// Drives resolution batch by batch
///
/// Within a batch every link is resolved concurrently. A batch settles only
/// when all of its tasks have produced an outcome; the next batch is not
/// dispatched before that. Failed tasks never cancel their siblings.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    concurrency: usize,
}

impl Scheduler {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Resolves every link with `resolve`
    ///
    /// # Arguments
    ///
    /// * `links` - The links to resolve, in discovery order
    /// * `resolve` - Produces the outcome of one link
    ///
    /// # Returns
    ///
    /// One report per batch, in dispatch order
    pub async fn run<F, Fut>(&self, links: Vec<Link>, resolve: F) -> Vec<BatchReport>
    where
        F: Fn(Link) -> Fut,
        Fut: Future<Output = ResolutionOutcome>,
    {
        let batches = plan_batches(links, self.concurrency);
        let total = batches.len();
        let mut reports = Vec::with_capacity(total);

        for (index, batch) in batches.into_iter().enumerate() {
            let size = batch.len();
            tracing::debug!("Dispatching batch {}/{} ({} links)", index + 1, total, size);

            let outcomes = join_all(batch.into_iter().map(&resolve)).await;

            let mut report = BatchReport {
                index,
                size,
                resolved: 0,
                failures: Vec::new(),
            };
            for outcome in &outcomes {
                match outcome {
                    ResolutionOutcome::Resolved(_) => report.resolved += 1,
                    ResolutionOutcome::Failed { cause, .. } => report.failures.push(cause.kind()),
                }
            }

            tracing::info!(
                "Batch {}/{} settled: {} resolved, {} failed",
                index + 1,
                total,
                report.resolved,
                report.failures.len()
            );
            reports.push(report);
        }

        reports
    }
}
