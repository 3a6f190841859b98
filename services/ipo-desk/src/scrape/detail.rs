//! Detail page text aggregation.

use scraper::{ElementRef, Html};

use super::joined_text;

/// Headings containing this text are community chatter, not IPO data.
pub const MESSAGE_BOARD: &str = "Message Board";

fn is_heading(el: &ElementRef<'_>) -> bool {
    matches!(el.value().name(), "h2" | "h3")
}

/// Flatten the detail page into one sectioned text blob.
///
/// Every `h2`/`h3` under the container opens a
/// `--- Section: {title} ---` block holding the text of its following
/// siblings up to the next heading. Returns `None` when no `div` carries
/// `container_id`.
pub fn aggregate_sections(html: &str, container_id: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let container = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "div" && el.value().id() == Some(container_id))?;

    let mut out = String::new();

    for heading in container
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(is_heading)
    {
        if heading.text().collect::<String>().contains(MESSAGE_BOARD) {
            continue;
        }

        out.push_str("\n\n--- Section: ");
        out.push_str(&joined_text(heading, ""));
        out.push_str(" ---\n");

        for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
            if is_heading(&sibling) {
                break;
            }
            out.push_str(&joined_text(sibling, " "));
            out.push(' ');
        }
    }

    Some(out.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_aggregated() {
        let html = r#"<html><body><div id="main">
            <h2>IPO Details</h2>
            <table><tr><td>Issue Size</td><td>500 Cr</td></tr></table>
            <p>Price band <b>100-110</b></p>
            <h3>Financials</h3>
            <p>Revenue up</p>
            </div></body></html>"#;

        let text = aggregate_sections(html, "main").unwrap();
        assert_eq!(
            text,
            "--- Section: IPO Details ---\nIssue Size 500 Cr Price band 100-110 \n\n--- Section: Financials ---\nRevenue up"
        );
    }

    #[test]
    fn test_message_board_skipped() {
        let html = r#"<div id="main">
            <h2>About</h2><p>Makes widgets</p>
            <h2>IPO Message Board</h2><p>buy buy buy</p>
            </div>"#;

        let text = aggregate_sections(html, "main").unwrap();
        assert!(text.contains("--- Section: About ---"));
        assert!(!text.contains("Message Board"));
        assert!(!text.contains("buy buy buy"));
    }

    #[test]
    fn test_nested_headings_collect_their_own_siblings() {
        let html = r#"<div id="main">
            <div class="card"><h3>Lot Size</h3><p>Min 1 lot</p></div>
            <div class="card"><h3>Timeline</h3><ul><li>Open</li><li>Close</li></ul></div>
            </div>"#;

        let text = aggregate_sections(html, "main").unwrap();
        assert_eq!(
            text,
            "--- Section: Lot Size ---\nMin 1 lot \n\n--- Section: Timeline ---\nOpen Close"
        );
    }

    #[test]
    fn test_script_text_ignored() {
        let html = r#"<div id="main"><h2>Info</h2><div>Visible<script>hidden()</script></div></div>"#;
        assert_eq!(
            aggregate_sections(html, "main").unwrap(),
            "--- Section: Info ---\nVisible"
        );
    }

    #[test]
    fn test_missing_container() {
        assert!(aggregate_sections("<div id=\"other\"><h2>X</h2></div>", "main").is_none());
    }

    #[test]
    fn test_container_must_be_a_div() {
        let html = r#"<section id="main"><h2>Nav</h2><p>menu</p></section>"#;
        assert!(aggregate_sections(html, "main").is_none());
    }

    #[test]
    fn test_div_container_found_past_other_element_with_same_id() {
        let html = r#"<nav id="main"><h2>Nav</h2></nav>
            <div id="main"><h2>About</h2><p>Makes widgets</p></div>"#;
        assert_eq!(
            aggregate_sections(html, "main").unwrap(),
            "--- Section: About ---\nMakes widgets"
        );
    }

    #[test]
    fn test_container_without_headings_is_empty() {
        assert_eq!(
            aggregate_sections("<div id=\"main\"><p>placeholder</p></div>", "main"),
            Some(String::new())
        );
    }
}
