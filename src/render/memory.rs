//! In-memory render engine
//!
//! [`StaticRenderer`] serves fixed HTML documents keyed by URL. Redirects,
//! load failures, load delays and engine faults can be injected per URL.
//! Every load and release is recorded on a shared timeline, which makes the
//! pipeline's batching and page-release behavior observable.

use super::document::{self, Element};
use super::{Page, RenderError, RenderResult, Renderer};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// What happened to a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderEventKind {
    /// A load of the URL was requested
    LoadStarted,
    /// The load failed, no page was opened
    LoadFailed,
    /// The page opened for the URL was released
    Closed,
}

/// One entry of the renderer timeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderEvent {
    /// Position on the timeline, starting at 0
    pub sequence: usize,
    /// The URL the load was requested for (before redirects)
    pub url: String,
    pub kind: RenderEventKind,
}

#[derive(Debug, Default)]
struct Tracker {
    events: Mutex<Vec<RenderEvent>>,
    open_pages: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl Tracker {
    fn record(&self, url: &str, kind: RenderEventKind) {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        let sequence = events.len();
        events.push(RenderEvent {
            sequence,
            url: url.to_string(),
            kind,
        });
    }

    fn begin(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn settle(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Render engine serving documents from memory
#[derive(Debug, Default)]
pub struct StaticRenderer {
    documents: HashMap<String, String>,
    redirects: HashMap<String, String>,
    failures: HashMap<String, RenderError>,
    delays: HashMap<String, Duration>,
    faults: HashSet<String>,
    tracker: Arc<Tracker>,
}

impl StaticRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` at `url`
    pub fn with_document(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.documents.insert(url.into(), html.into());
        self
    }

    /// Makes a load of `from` land on `to`
    pub fn with_redirect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.redirects.insert(from.into(), to.into());
        self
    }

    /// Makes every load of `url` fail with `error`
    pub fn with_failure(mut self, url: impl Into<String>, error: RenderError) -> Self {
        self.failures.insert(url.into(), error);
        self
    }

    /// Delays every load of `url` by `delay`
    pub fn with_delay(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(url.into(), delay);
        self
    }

    /// Makes the page loaded for `url` panic when waited on, as an engine
    /// crash in the middle of extraction would
    pub fn with_fault(mut self, url: impl Into<String>) -> Self {
        self.faults.insert(url.into());
        self
    }

    /// Snapshot of the load/close timeline
    pub fn events(&self) -> Vec<RenderEvent> {
        self.tracker
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Pages opened and not yet closed
    pub fn open_pages(&self) -> usize {
        self.tracker.open_pages.load(Ordering::SeqCst)
    }

    /// Highest number of loads that were started and not yet settled
    pub fn peak_in_flight(&self) -> usize {
        self.tracker.peak_in_flight.load(Ordering::SeqCst)
    }

    fn fail(&self, url: &str, error: RenderError) -> RenderResult<StaticPage> {
        self.tracker.record(url, RenderEventKind::LoadFailed);
        self.tracker.settle();
        Err(error)
    }
}

#[async_trait]
impl Renderer for StaticRenderer {
    type Page = StaticPage;

    async fn load(&self, url: &str) -> RenderResult<StaticPage> {
        self.tracker.record(url, RenderEventKind::LoadStarted);
        self.tracker.begin();

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }

        if let Some(error) = self.failures.get(url) {
            return self.fail(url, error.clone());
        }

        let final_url = self
            .redirects
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string());

        let Some(html) = self.documents.get(&final_url) else {
            return self.fail(
                url,
                RenderError::HttpStatus {
                    url: final_url,
                    status: 404,
                },
            );
        };

        self.tracker.open_pages.fetch_add(1, Ordering::SeqCst);

        Ok(StaticPage {
            requested: url.to_string(),
            url: final_url,
            html: html.clone(),
            faulty: self.faults.contains(url),
            tracker: Arc::clone(&self.tracker),
        })
    }
}

/// A document served by [`StaticRenderer`]
#[derive(Debug)]
pub struct StaticPage {
    requested: String,
    url: String,
    html: String,
    faulty: bool,
    tracker: Arc<Tracker>,
}

#[async_trait]
impl Page for StaticPage {
    fn current_url(&self) -> &str {
        &self.url
    }

    fn query(&self, selector: &str) -> RenderResult<Vec<Element>> {
        document::select_all(&self.html, selector)
    }

    /// The document never changes, so a missing element times out at once
    async fn wait_for(&self, selector: &str, timeout: Duration) -> RenderResult<Element> {
        if self.faulty {
            panic!("render engine crashed while waiting on {}", self.url);
        }

        document::select_first(&self.html, selector)?.ok_or_else(|| {
            RenderError::ElementTimeout {
                selector: selector.to_string(),
                timeout,
            }
        })
    }

    async fn close(self) {
        self.tracker.open_pages.fetch_sub(1, Ordering::SeqCst);
        self.tracker.record(&self.requested, RenderEventKind::Closed);
        self.tracker.settle();
    }
}
