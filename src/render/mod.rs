//! Render capability consumed by the harvesting pipeline
//!
//! The pipeline never talks to a page-loading engine directly. It goes
//! through two narrow traits:
//! - [`Renderer`] loads a URL and hands back an exclusively owned page
//! - [`Page`] answers selector queries, waits for an element, exposes its
//!   current URL after redirects, and is released with [`Page::close`]
//!
//! Two engines implement them: [`HttpRenderer`] for real runs and
//! [`StaticRenderer`] which serves fixed documents from memory.

mod document;
mod http;
mod memory;

pub use document::Element;
pub use http::{build_http_client, HttpPage, HttpRenderer};
pub use memory::{RenderEvent, RenderEventKind, StaticPage, StaticRenderer};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a render engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Load timed out for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Element '{selector}' did not appear within {timeout:?}")]
    ElementTimeout { selector: String, timeout: Duration },

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Loads pages
///
/// A renderer is shared by every task of a run; it is only used to open new,
/// independent pages.
#[async_trait]
pub trait Renderer: Send + Sync {
    type Page: Page;

    /// Loads `url` and returns a page owned by the caller
    async fn load(&self, url: &str) -> RenderResult<Self::Page>;
}

/// A loaded document
#[async_trait]
pub trait Page: Send + Sync {
    /// URL of the document after any redirects
    fn current_url(&self) -> &str;

    /// Returns every element matching `selector`, in document order
    fn query(&self, selector: &str) -> RenderResult<Vec<Element>>;

    /// Waits until an element matching `selector` is present
    async fn wait_for(&self, selector: &str, timeout: Duration) -> RenderResult<Element>;

    /// Releases the page
    async fn close(self);
}
