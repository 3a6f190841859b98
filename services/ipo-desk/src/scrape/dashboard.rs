//! Mainboard dashboard table extraction.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::trimmed_text;
use crate::model::{IpoKind, IpoListing, IpoListings};

/// Heading text that precedes the mainboard table.
pub const MAINBOARD_HEADING: &str = "Current IPOs (Mainboard)";
pub const MAINBOARD_HEADING_TAG: &str = "h2";

const STATUS_CELL: usize = 3;
const MIN_CELLS: usize = 4;

/// Pull the current and upcoming mainboard IPOs out of the dashboard page.
///
/// Row order is preserved. Missing structure yields empty lists rather than
/// an error; rows without a resolvable link are skipped individually.
pub fn extract_listings(html: &str, base_url: &str) -> IpoListings {
    let mut listings = IpoListings::default();

    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(e) => {
            tracing::error!(base_url = %base_url, error = %e, "Invalid site base URL");
            return listings;
        }
    };

    let document = Html::parse_document(html);

    let Some(heading) = find_heading(&document) else {
        tracing::warn!(heading = MAINBOARD_HEADING, "Mainboard heading not found");
        return listings;
    };

    let Some(table) = next_table(&document, heading) else {
        tracing::warn!("No table follows the mainboard heading");
        return listings;
    };

    let (Some(tbody), Some(tr), Some(td), Some(anchor)) = (
        selector("tbody"),
        selector("tr"),
        selector("td"),
        selector("a"),
    ) else {
        return listings;
    };

    let Some(body) = table.select(&tbody).next() else {
        tracing::warn!("Mainboard table has no body");
        return listings;
    };

    for row in body.select(&tr) {
        let cells: Vec<ElementRef<'_>> = row.select(&td).collect();
        if cells.len() < MIN_CELLS {
            continue;
        }

        let Some(kind) = classify(&trimmed_text(cells[STATUS_CELL])) else {
            continue;
        };

        let name = trimmed_text(cells[0]);
        let href = cells[0]
            .select(&anchor)
            .next()
            .and_then(|a| a.value().attr("href"));

        let Some(href) = href else {
            tracing::debug!(name = %name, "Skipping row without link");
            continue;
        };

        match base.join(href) {
            Ok(url) => listings.push(kind, IpoListing::new(name, url.to_string())),
            Err(e) => tracing::debug!(name = %name, href = %href, error = %e, "Skipping row with bad link"),
        }
    }

    listings
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn classify(status: &str) -> Option<IpoKind> {
    let status = status.to_lowercase();
    IpoKind::ALL.into_iter().find(|kind| status == kind.as_str())
}

fn find_heading(document: &Html) -> Option<ElementRef<'_>> {
    let headings = selector(MAINBOARD_HEADING_TAG)?;
    document
        .select(&headings)
        .find(|h| h.text().collect::<String>().contains(MAINBOARD_HEADING))
}

/// First `table` after `anchor` in document order.
fn next_table<'a>(document: &'a Html, anchor: ElementRef<'a>) -> Option<ElementRef<'a>> {
    let anchor_id = anchor.id();
    document
        .root_element()
        .descendants()
        .skip_while(|node| node.id() != anchor_id)
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
}
