//! Link discovery on a ranked listing page
//!
//! Each ranked entry of a listing is a wrapper element whose first anchor
//! points at the channel. Hrefs are resolved against the listing URL and
//! URI-decoded; entries that cannot be turned into a link are dropped and
//! logged without failing the run.

use super::Link;
use crate::render::{Page, RenderResult};
use crate::url::{decode_uri, resolve_href};

/// Wrapper element of one ranked entry on the listing page
pub const WRAPPER_SELECTOR: &str = "[style='float: left; width: 350px; line-height: 25px;']";

/// Links found on a listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Wrapper elements inspected
    pub examined: usize,

    /// Wrappers that did not yield a valid link
    pub dropped: usize,

    /// Valid links, in page order, after the cap was applied
    pub links: Vec<Link>,
}

/// Extracts the channel links from a loaded listing page
///
/// # Arguments
///
/// * `page` - The loaded listing page
/// * `cap` - Keep only the first `cap` valid links, when set
///
/// # Returns
///
/// * `Ok(Discovery)` - The valid links plus drop accounting
/// * `Err(RenderError)` - The page could not be queried
pub fn discover_links<P: Page>(page: &P, cap: Option<usize>) -> RenderResult<Discovery> {
    let wrappers = page.query(WRAPPER_SELECTOR)?;
    let mut discovery = Discovery {
        examined: wrappers.len(),
        ..Discovery::default()
    };

    for wrapper in &wrappers {
        let Some(anchor) = wrapper.select_first("a")? else {
            tracing::warn!("Failure | Listing entry without a link");
            discovery.dropped += 1;
            continue;
        };

        let Some(raw) = anchor.attribute("href") else {
            tracing::warn!("Failure | Listing link without an href");
            discovery.dropped += 1;
            continue;
        };

        match link_from_href(page.current_url(), raw) {
            Some(link) => discovery.links.push(link),
            None => {
                tracing::warn!("Failure | Malformed URI: {}", raw);
                discovery.dropped += 1;
            }
        }
    }

    if let Some(cap) = cap {
        discovery.links.truncate(cap);
    }

    Ok(discovery)
}

/// Resolves and decodes one listing href
fn link_from_href(base: &str, raw: &str) -> Option<Link> {
    let absolute = resolve_href(base, raw)?;
    let decoded = decode_uri(&absolute).ok()?;
    Link::parse(&decoded)
}
