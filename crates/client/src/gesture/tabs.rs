//! Tab list harvesting from the page's navigation region.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

use crate::fetch::tab_path;
use reflekt_core::Error;

/// Which neighbour of the current tab to move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Following tab; produced by a leftward swipe.
    Next,
    /// Preceding tab; produced by a rightward swipe.
    Previous,
}

/// A tab entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    /// The href as found on the page or in the fallback list.
    pub href: String,
    /// Parsed URL; `None` when the href could not be parsed.
    pub url: Option<Url>,
}

/// Ordered, immutable list of tab URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabList {
    tabs: Vec<Tab>,
}

impl TabList {
    /// Build a tab list from hrefs, resolving each against `base`.
    ///
    /// Hrefs that fail to parse are kept in position but never match a page.
    /// Duplicates (by normalized path) are dropped, first one wins.
    pub fn from_hrefs<I, S>(hrefs: I, base: &Url) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut tabs = Vec::new();

        for href in hrefs {
            let href = href.as_ref().trim();
            let url = base.join(href).ok();

            if let Some(url) = &url
                && !seen.insert(tab_path(url))
            {
                continue;
            }

            tabs.push(Tab { href: href.to_string(), url });
        }

        Self { tabs }
    }

    /// Build the tab list from anchors matching `selector` in `html`.
    ///
    /// Falls back to `fallback` (resolved against `page_url`) when the page
    /// has no matching anchors.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `selector` is not a valid CSS selector.
    pub fn from_html(html: &str, page_url: &Url, selector: &str, fallback: &[String]) -> Result<Self, Error> {
        let selector =
            Selector::parse(selector).map_err(|e| Error::InvalidInput(format!("invalid nav selector {selector}: {e}")))?;
        let document = Html::parse_document(html);

        let hrefs: Vec<&str> = document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .filter(|href| page_url.join(href).is_ok())
            .collect();

        if hrefs.is_empty() {
            tracing::debug!("no navigation anchors found, using {} fallback tabs", fallback.len());
            return Ok(Self::from_hrefs(fallback, page_url));
        }

        Ok(Self::from_hrefs(hrefs, page_url))
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    /// Position of the tab whose path matches `current`'s path.
    pub fn index_of(&self, current: &Url) -> Option<usize> {
        let path = tab_path(current);
        self.tabs
            .iter()
            .position(|tab| tab.url.as_ref().is_some_and(|url| tab_path(url) == path))
    }

    /// The tab next to `current` in `direction`, wrapping at both ends.
    ///
    /// Returns `None` when `current` is not in the list.
    pub fn neighbor(&self, current: &Url, direction: SwipeDirection) -> Option<&Tab> {
        let index = self.index_of(current)?;
        let len = self.tabs.len();
        let target = match direction {
            SwipeDirection::Next => (index + 1) % len,
            SwipeDirection::Previous => (index + len - 1) % len,
        };
        self.tabs.get(target)
    }
}
