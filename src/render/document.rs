//! Owned element snapshots over parsed HTML
//!
//! `scraper` documents are not `Send`, so they never outlive the call that
//! parses them. Queries copy what callers need into an [`Element`].

use super::{RenderError, RenderResult};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

/// Snapshot of one element of a rendered document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    attributes: BTreeMap<String, String>,
    text: String,
    inner_html: String,
}

impl Element {
    fn from_ref(element: ElementRef<'_>) -> Self {
        Self {
            attributes: element
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            text: element.text().collect(),
            inner_html: element.inner_html(),
        }
    }

    /// Raw attribute value, as written in the markup
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Concatenated text content of the element and its descendants
    pub fn text(&self) -> &str {
        &self.text
    }

    /// First descendant matching `selector`
    pub fn select_first(&self, selector: &str) -> RenderResult<Option<Element>> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.inner_html);
        let found = fragment.select(&selector).next().map(Element::from_ref);
        Ok(found)
    }
}

fn parse_selector(selector: &str) -> RenderResult<Selector> {
    Selector::parse(selector).map_err(|e| RenderError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Every element of `html` matching `selector`
pub(crate) fn select_all(html: &str, selector: &str) -> RenderResult<Vec<Element>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    let elements = document.select(&selector).map(Element::from_ref).collect();
    Ok(elements)
}

/// First element of `html` matching `selector`
pub(crate) fn select_first(html: &str, selector: &str) -> RenderResult<Option<Element>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    let found = document.select(&selector).next().map(Element::from_ref);
    Ok(found)
}
