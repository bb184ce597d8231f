//! URL handling module for Channel-Harvest
//!
//! This module provides browser-compatible URI decoding, href resolution
//! against a page URL, and classification of a landing page by its path.

mod classify;
mod decode;

// Re-export main functions
pub use classify::{classify_page, final_path_segment, PageKind, SEARCH_SEGMENT};
pub use decode::{decode_uri, DecodeError};

use url::Url;

/// Resolves an href against the URL of the page it was read from
///
/// This mirrors what a browser exposes as `anchor.href`: relative references
/// become absolute, absolute ones are returned in serialized form.
/// Returns `None` when the base is not an absolute URL or the join fails.
pub fn resolve_href(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(|url| url.to_string())
}
