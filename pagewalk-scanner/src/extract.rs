use crate::address::Address;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Pulls outbound references out of fetched content.
///
/// Implementations must return absolute, fragment-stripped addresses without
/// duplicates and in document order, so sibling traversal is reproducible.
/// Content that cannot be parsed yields no references.
pub trait Extractor {
    fn extract(&self, content: &str, base: &Address) -> Vec<Address>;
}

/// Extracts `<a href>` targets from HTML or XHTML.
#[derive(Debug, Clone, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }

    fn resolve(base: &Url, href: &str) -> Option<Address> {
        let href = href.trim();
        if href.is_empty() || href.to_lowercase().starts_with("javascript:") {
            return None;
        }

        let mut resolved = base.join(href).ok()?;
        resolved.set_fragment(None);
        Some(Address::new(resolved.to_string()))
    }
}

impl Extractor for HtmlExtractor {
    fn extract(&self, content: &str, base: &Address) -> Vec<Address> {
        let Ok(base_url) = Url::parse(base.as_str()) else {
            debug!("Cannot resolve references against {}", base);
            return Vec::new();
        };

        let mut own_page = base_url.clone();
        own_page.set_fragment(None);
        let own_page = Address::new(own_page.to_string());

        let document = Html::parse_document(content);
        let link_selector = Selector::parse("a[href]").expect("static selector is valid");

        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in document.select(&link_selector) {
            if let Some(href) = element.value().attr("href")
                && let Some(address) = Self::resolve(&base_url, href)
                && address != own_page
                && seen.insert(address.clone())
            {
                links.push(address);
            }
        }

        debug!("Found {} references on {}", links.len(), base);
        links
    }
}
