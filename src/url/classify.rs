//! Landing page classification

use url::Url;

/// Path segment marking a search-result landing page
pub const SEARCH_SEGMENT: &str = "search";

/// Shape of the page a channel link lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// The link fell through to a search page listing the channel
    SearchResult,

    /// The link landed on the channel's own page
    DirectChannel,
}

/// Classifies a landing page from its current URL
///
/// A page is a search result when any path segment is exactly `search`.
/// Substrings and prefixes (`/searches`, `/research`) do not count.
pub fn classify_page(url: &str) -> PageKind {
    let on_search = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .map(|mut segments| segments.any(|s| s == SEARCH_SEGMENT))
            .unwrap_or(false),
        Err(_) => url.split('/').any(|s| s == SEARCH_SEGMENT),
    };

    if on_search {
        PageKind::SearchResult
    } else {
        PageKind::DirectChannel
    }
}

/// Returns the text after the last `/`
pub fn final_path_segment(s: &str) -> &str {
    s.rsplit('/').next().unwrap_or(s)
}
