//! HTML extractor for resource references
//!
//! Finds every element of the requested kind that carries a source attribute and
//! yields the attribute value untouched:
//! - Document order is preserved
//! - Duplicates are preserved (the namer disambiguates repeated downloads)
//! - Elements of other tags, or without the attribute, are never yielded

use crate::config::ResourceKind;
use crate::url::ResourceReference;
use scraper::{ElementRef, Html};

/// A parsed HTML page
///
/// Reference iteration is lazy and restartable: calling
/// [`references`](ParsedPage::references) twice yields the same sequence.
pub struct ParsedPage {
    document: Html,
}

impl ParsedPage {
    /// Parses page content; malformed markup is recovered, never rejected
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Iterates the references of `kind` in document order
    ///
    /// # Example
    ///
    /// ```
    /// use media_harvester::config::ResourceKind;
    /// use media_harvester::crawler::ParsedPage;
    ///
    /// let page = ParsedPage::parse(r#"<img src="a.png"><img alt="none"><img src="b.png">"#);
    /// let refs: Vec<String> = page
    ///     .references(ResourceKind::Image)
    ///     .map(|r| r.raw)
    ///     .collect();
    /// assert_eq!(refs, vec!["a.png", "b.png"]);
    /// ```
    pub fn references(&self, kind: ResourceKind) -> impl Iterator<Item = ResourceReference> + '_ {
        let tag = kind.tag_name();
        let attribute = kind.source_attribute();

        self.document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(move |element| element.value().name() == tag)
            .filter_map(move |element| element.value().attr(attribute))
            .map(ResourceReference::new)
    }
}

/// Convenience function collecting the references of `kind` found in `html`
///
/// # Arguments
///
/// * `html` - The page body
/// * `kind` - The resource kind whose tag is searched
///
/// # Returns
///
/// All references in document order, duplicates included
pub fn extract_references(html: &str, kind: ResourceKind) -> Vec<ResourceReference> {
    ParsedPage::parse(html).references(kind).collect()
}
