//! Per-link page resolution
//!
//! A link is loaded, the landing page is classified from its URL, and the
//! identifier is extracted with the strategy of that page kind:
//! - search result pages carry the identifier as text in a metadata element
//! - channel pages carry it as the last path segment of the "visit channel"
//!   button's href
//!
//! Every failure is confined to the link being resolved.

use super::{Identifier, Link, ResolutionOutcome};
use crate::render::{Page, RenderError, Renderer};
use crate::url::{classify_page, decode_uri, final_path_segment, resolve_href, DecodeError, PageKind};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use thiserror::Error;

/// Metadata element holding the identifier on a search result page
pub const SEARCH_META_SELECTOR: &str =
    r#"[style="margin-left: 10px; font-size: 0.7em; color:#aaa;"]"#;

/// "Visit channel" button on a channel page
pub const VISIT_CHANNEL_SELECTOR: &str = "a.core-button.-margin.core-small-wide.ui-black";

/// Why a link did not resolve
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Visit-channel button has no href")]
    MissingHref,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Extracted identifier is empty (from '{source_text}')")]
    EmptyIdentifier { source_text: String },

    #[error("Page fault during extraction: {0}")]
    Fault(String),
}

/// Coarse failure categories reported in run statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureKind {
    LoadTimeout,
    Network,
    ElementTimeout,
    MissingHref,
    Decode,
    EmptyIdentifier,
    Fault,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::LoadTimeout => "load_timeout",
            FailureKind::Network => "network",
            FailureKind::ElementTimeout => "element_timeout",
            FailureKind::MissingHref => "missing_href",
            FailureKind::Decode => "decode",
            FailureKind::EmptyIdentifier => "empty_identifier",
            FailureKind::Fault => "fault",
        }
    }
}

impl ResolveError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ResolveError::Render(RenderError::Timeout { .. }) => FailureKind::LoadTimeout,
            ResolveError::Render(RenderError::Network { .. })
            | ResolveError::Render(RenderError::HttpStatus { .. }) => FailureKind::Network,
            ResolveError::Render(RenderError::ElementTimeout { .. }) => FailureKind::ElementTimeout,
            ResolveError::Render(RenderError::Selector { .. }) => FailureKind::Fault,
            ResolveError::MissingHref => FailureKind::MissingHref,
            ResolveError::Decode(_) => FailureKind::Decode,
            ResolveError::EmptyIdentifier { .. } => FailureKind::EmptyIdentifier,
            ResolveError::Fault(_) => FailureKind::Fault,
        }
    }
}

/// Settings shared by every resolver task of a run
#[derive(Debug, Clone, Copy)]
pub struct ResolveSettings {
    /// How long to wait for the page-kind specific element
    pub wait_timeout: Duration,
}

/// Resolves one link to its outcome
///
/// Never fails: every error is logged and reported as
/// [`ResolutionOutcome::Failed`].
pub async fn resolve_link<R: Renderer>(
    renderer: &R,
    link: &Link,
    settings: &ResolveSettings,
) -> ResolutionOutcome {
    match resolve_identifier(renderer, link, settings).await {
        Ok(identifier) => {
            tracing::info!("Success | {}", identifier);
            ResolutionOutcome::Resolved(identifier)
        }
        Err(cause) => {
            tracing::warn!("Failure | {} | {}", link, cause);
            ResolutionOutcome::Failed {
                link: link.clone(),
                cause,
            }
        }
    }
}

/// Loads the link and extracts its identifier
///
/// The page is closed once extraction finishes, whether it returned an
/// identifier, an error, or panicked.
async fn resolve_identifier<R: Renderer>(
    renderer: &R,
    link: &Link,
    settings: &ResolveSettings,
) -> Result<Identifier, ResolveError> {
    let page = renderer.load(link.as_str()).await?;

    let extraction = AssertUnwindSafe(extract_identifier(&page, settings))
        .catch_unwind()
        .await;

    page.close().await;

    extraction.unwrap_or_else(|panic| Err(ResolveError::Fault(panic_message(panic.as_ref()))))
}

/// Extracts the identifier from an already loaded page
pub async fn extract_identifier<P: Page>(
    page: &P,
    settings: &ResolveSettings,
) -> Result<Identifier, ResolveError> {
    match classify_page(page.current_url()) {
        PageKind::SearchResult => extract_from_search(page, settings.wait_timeout).await,
        PageKind::DirectChannel => extract_from_channel(page, settings.wait_timeout).await,
    }
}

/// Reads the metadata element's text verbatim
async fn extract_from_search<P: Page>(
    page: &P,
    timeout: Duration,
) -> Result<Identifier, ResolveError> {
    let element = page.wait_for(SEARCH_META_SELECTOR, timeout).await?;
    non_empty(element.text(), element.text())
}

/// Takes the last path segment of the decoded visit-channel href
async fn extract_from_channel<P: Page>(
    page: &P,
    timeout: Duration,
) -> Result<Identifier, ResolveError> {
    let element = page.wait_for(VISIT_CHANNEL_SELECTOR, timeout).await?;
    let raw = element.attribute("href").ok_or(ResolveError::MissingHref)?;

    let href = resolve_href(page.current_url(), raw).unwrap_or_else(|| raw.to_string());
    let decoded = decode_uri(&href)?;

    non_empty(final_path_segment(&decoded), &decoded)
}

fn non_empty(identifier: &str, source_text: &str) -> Result<Identifier, ResolveError> {
    if identifier.is_empty() {
        return Err(ResolveError::EmptyIdentifier {
            source_text: source_text.to_string(),
        });
    }
    Ok(Identifier::from(identifier))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
