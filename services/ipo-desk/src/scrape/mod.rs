//! HTML extraction for the dashboard and detail pages.

pub mod dashboard;
pub mod detail;

pub use dashboard::{extract_listings, MAINBOARD_HEADING, MAINBOARD_HEADING_TAG};
pub use detail::{aggregate_sections, MESSAGE_BOARD};

use scraper::{ElementRef, Node};

/// Collect the text nodes under `element` in document order, skipping
/// script and style contents.
pub(crate) fn text_fragments<'a>(element: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push(text),
            Node::Element(el) if matches!(el.name(), "script" | "style") => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    text_fragments(child_el, out);
                }
            }
            _ => {}
        }
    }
}

/// Trimmed, non-empty text fragments of `element` joined with `separator`.
pub(crate) fn joined_text(element: ElementRef<'_>, separator: &str) -> String {
    let mut fragments = Vec::new();
    text_fragments(element, &mut fragments);
    fragments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// All text of `element` concatenated, then trimmed.
pub(crate) fn trimmed_text(element: ElementRef<'_>) -> String {
    let mut fragments = Vec::new();
    text_fragments(element, &mut fragments);
    fragments.concat().trim().to_string()
}
