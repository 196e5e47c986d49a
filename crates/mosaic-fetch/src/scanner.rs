//! Markup scanner
//!
//! Extracts image URLs from a search-results document. The document is
//! parsed as HTML, so `<img` text inside comments or script bodies is never
//! mistaken for an element. For each `img` element, the first attribute whose
//! name starts with `src` is written back as `name="value"`; that token, cut
//! at the first whitespace, supplies the value between its first two `"`
//! characters. Only values starting with `http` are kept.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

/// Prefix an extracted value must carry to be fetched
const ELIGIBLE_PREFIX: &str = "http";

static IMG: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("img selector is valid"));

/// Result of scanning one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Eligible URLs in document order
    pub urls: Vec<String>,
    /// Image elements seen
    pub tags: usize,
    /// Elements without a parsable `src` value
    pub misses: usize,
    /// Parsed values rejected by the `http` filter
    pub ineligible: usize,
}

/// Scan a document, keeping counts of what was skipped
#[must_use]
pub fn scan_document(document: &str) -> ScanSummary {
    let html = Html::parse_document(document);
    let mut summary = ScanSummary::default();

    for element in html.select(&IMG) {
        summary.tags += 1;

        let attribute = src_attribute(element);
        let Some(value) = attribute.as_deref().and_then(src_value) else {
            tracing::trace!("No src value on img element {}", summary.tags);
            summary.misses += 1;
            continue;
        };

        if is_eligible(value) {
            summary.urls.push(value.to_string());
        } else {
            summary.ineligible += 1;
        }
    }

    tracing::debug!(
        "Scanned {} img tags: {} eligible, {} ineligible, {} unparsable",
        summary.tags,
        summary.urls.len(),
        summary.ineligible,
        summary.misses
    );

    summary
}

/// Eligible image URLs of a document, in document order
#[inline]
#[must_use]
pub fn extract_image_urls(document: &str) -> Vec<String> {
    scan_document(document).urls
}

/// Check the `http` prefix filter
#[inline]
#[must_use]
pub fn is_eligible(value: &str) -> bool {
    value.starts_with(ELIGIBLE_PREFIX)
}

/// First `src`-prefixed attribute of an element, serialized as `name="value"`
fn src_attribute(element: ElementRef<'_>) -> Option<String> {
    element
        .value()
        .attrs()
        .find(|(name, _)| name.starts_with("src"))
        .map(|(name, value)| format!("{name}=\"{value}\""))
}

/// Value of a serialized `name="value"` attribute
///
/// The attribute is cut at its first whitespace; both the opening and the
/// closing `"` must survive the cut.
#[must_use]
pub fn src_value(attribute: &str) -> Option<&str> {
    let token = attribute.split_whitespace().next()?;
    let mut parts = token.split('"');
    parts.next()?;
    let value = parts.next()?;
    parts.next()?;
    Some(value)
}
