//! Touch target inspection.
//!
//! A touch that starts on (or inside) an interactive element belongs to that
//! element, not to the tab swipe.

use scraper::{ElementRef, Html, Selector};

/// Tags whose touches are never treated as swipes.
const INTERACTIVE_TAGS: &[&str] = &["input", "textarea", "select", "button", "a"];

/// One element on the path from the touch target up to the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    /// Lower-case tag name.
    pub tag: String,
    /// Raw `contenteditable` attribute value, if present.
    pub contenteditable: Option<String>,
}

impl ElementInfo {
    pub fn new(tag: &str) -> Self {
        Self { tag: tag.to_ascii_lowercase(), contenteditable: None }
    }

    pub fn editable(tag: &str, value: &str) -> Self {
        Self { tag: tag.to_ascii_lowercase(), contenteditable: Some(value.to_string()) }
    }

    fn is_editable(&self) -> bool {
        self.contenteditable
            .as_deref()
            .is_some_and(|v| !v.trim().eq_ignore_ascii_case("false"))
    }

    fn is_interactive(&self) -> bool {
        INTERACTIVE_TAGS.contains(&self.tag.as_str()) || self.is_editable()
    }
}

/// The element a touch started on, with its ancestors (innermost first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TouchTarget {
    chain: Vec<ElementInfo>,
}

impl TouchTarget {
    pub fn new(chain: Vec<ElementInfo>) -> Self {
        Self { chain }
    }

    /// Build the target chain from a parsed element and its ancestors.
    pub fn from_element(element: ElementRef<'_>) -> Self {
        let chain = std::iter::once(element)
            .chain(element.ancestors().filter_map(ElementRef::wrap))
            .map(|el| {
                let value = el.value();
                ElementInfo {
                    tag: value.name().to_ascii_lowercase(),
                    contenteditable: value.attr("contenteditable").map(str::to_string),
                }
            })
            .collect();
        Self { chain }
    }

    /// Locate the first element matching `selector` in a document.
    ///
    /// Returns `None` for an invalid selector or when nothing matches.
    pub fn select(document: &Html, selector: &str) -> Option<Self> {
        let selector = Selector::parse(selector).ok()?;
        document.select(&selector).next().map(Self::from_element)
    }

    /// Parse `html` and locate the first element matching `selector`.
    pub fn find(html: &str, selector: &str) -> Option<Self> {
        Self::select(&Html::parse_document(html), selector)
    }

    /// Whether the touch started on, or inside, a form control, link or
    /// editable region.
    pub fn is_interactive(&self) -> bool {
        self.chain.iter().any(ElementInfo::is_interactive)
    }
}
