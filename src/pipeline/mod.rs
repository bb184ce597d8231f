//! Resolution pipeline
//!
//! This module contains the core harvesting logic:
//! - Link discovery on the ranked listing page
//! - Batch scheduling with a barrier between batches
//! - Per-link page classification and identifier extraction
//! - Collection of the resolved identifiers

mod aggregator;
mod discovery;
mod resolver;
mod scheduler;

pub use aggregator::ResultSet;
pub use discovery::{discover_links, Discovery, WRAPPER_SELECTOR};
pub use resolver::{
    extract_identifier, resolve_link, FailureKind, ResolveError, ResolveSettings,
    SEARCH_META_SELECTOR, VISIT_CHANNEL_SELECTOR,
};
pub use scheduler::{batch_size, plan_batches, BatchReport, Scheduler};

use crate::config::Config;
use crate::listing::RunParameters;
use crate::output::{artifact_path, log_statistics, JsonFileSink, OutputSink, RunStatistics};
use crate::render::{HttpRenderer, Page, RenderResult, Renderer};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Absolute, decoded URL of a channel entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link(String);

impl Link {
    /// Accepts only absolute URLs
    pub fn parse(url: &str) -> Option<Link> {
        ::url::Url::parse(url).ok()?;
        Some(Link(url.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Channel handle or slug extracted from a landing page
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Identifier(value.to_string())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Identifier(value)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of resolving one link, produced exactly once per link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved(Identifier),
    Failed { link: Link, cause: ResolveError },
}

/// Settings of a pipeline run that come from configuration
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Base the listing URL is built on
    pub base_url: String,

    pub resolve: ResolveSettings,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.listing.base_url.clone(),
            resolve: ResolveSettings {
                wait_timeout: config.render.wait_timeout(),
            },
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Resolved identifiers, in completion order
    pub identifiers: Vec<Identifier>,

    pub statistics: RunStatistics,
}

/// Runs discovery and resolution for one set of run parameters
///
/// A listing page that cannot be loaded ends the run early with no
/// identifiers; the failure is recorded in the statistics so the caller can
/// still persist the (empty) result.
///
/// # Arguments
///
/// * `renderer` - The render engine shared by every task
/// * `params` - The run parameters
/// * `settings` - Listing base URL and resolver settings
pub async fn run_pipeline<R: Renderer>(
    renderer: &R,
    params: &RunParameters,
    settings: &PipelineSettings,
) -> RunReport {
    let started = std::time::Instant::now();
    let mut statistics = RunStatistics::default();

    let listing_url = params.source.listing_url(&settings.base_url, params.metric);
    tracing::info!("Loading listing {}", listing_url);

    let discovery = match load_listing(renderer, &listing_url, params.source.cap()).await {
        Ok(discovery) => discovery,
        Err(e) => {
            tracing::error!("Failure: listing {} | {}", listing_url, e);
            statistics.listing_error = Some(e.to_string());
            statistics.elapsed = started.elapsed();
            return RunReport {
                identifiers: Vec::new(),
                statistics,
            };
        }
    };

    statistics.links_examined = discovery.examined;
    statistics.links_dropped = discovery.dropped;
    statistics.links_scheduled = discovery.links.len();
    tracing::info!("Found {} channels", discovery.links.len());

    let results = ResultSet::new();
    let scheduler = Scheduler::new(params.concurrency.get());
    let batches = {
        let results = &results;
        let resolve = &settings.resolve;
        scheduler
            .run(discovery.links, move |link| async move {
                let outcome = resolve_link(renderer, &link, resolve).await;
                if let ResolutionOutcome::Resolved(identifier) = &outcome {
                    results.push(identifier.clone());
                }
                outcome
            })
            .await
    };

    for batch in &batches {
        statistics.record_batch(batch);
    }
    statistics.elapsed = started.elapsed();

    RunReport {
        identifiers: results.freeze(),
        statistics,
    }
}

/// Runs the pipeline and persists its identifiers through `sink`
///
/// The sink is written exactly once, after resolution has finished. This
/// also holds when the listing could not be loaded or every link failed, in
/// which case it receives whatever was resolved (possibly nothing).
///
/// # Returns
///
/// * `Ok(RunReport)` - The run report, once the identifiers were written
/// * `Err(HarvestError)` - The sink failed to write
pub async fn harvest<R, S>(
    renderer: &R,
    params: &RunParameters,
    settings: &PipelineSettings,
    sink: &S,
) -> crate::Result<RunReport>
where
    R: Renderer,
    S: OutputSink + ?Sized,
{
    let report = run_pipeline(renderer, params, settings).await;
    log_statistics(&report.statistics);

    sink.write(&report.identifiers)?;

    Ok(report)
}

/// Harvests over HTTP and writes the JSON artifact under the data directory
///
/// The artifact is named after the run parameters and `started`.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written artifact
/// * `Err(HarvestError)` - The HTTP client could not be built or the
///   artifact could not be written
pub async fn harvest_to_file<Tz>(
    config: &Config,
    params: &RunParameters,
    started: &DateTime<Tz>,
) -> crate::Result<PathBuf>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let renderer = HttpRenderer::new(&config.render)?;
    let settings = PipelineSettings::from_config(config);

    let path = artifact_path(Path::new(&config.output.data_dir), params, started);
    harvest(&renderer, params, &settings, &JsonFileSink::new(&path)).await?;

    Ok(path)
}

/// Loads the listing page and discovers its links
async fn load_listing<R: Renderer>(
    renderer: &R,
    url: &str,
    cap: Option<usize>,
) -> RenderResult<Discovery> {
    let page = renderer.load(url).await?;
    let discovery = discover_links(&page, cap);
    page.close().await;
    discovery
}
