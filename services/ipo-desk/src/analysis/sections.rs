//! Split free-form analysis text into titled sections.
//!
//! A line opens a new section when, checked in this order:
//! 1. it is wrapped in `**` and ends with `:**` (e.g. `**Final Verdict:**`), or
//! 2. it starts with a digit 1-6 followed by a period (e.g. `3. Financial Health`).
//!
//! Text before the first header is dropped, as are blank lines.

use serde::ser::{Serialize, SerializeMap, Serializer};

const NUMBERED_PREFIXES: [&str; 6] = ["1.", "2.", "3.", "4.", "5.", "6."];

/// Ordered section title -> body mapping. Titles are unique; a repeated
/// title replaces the earlier body but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisSections {
    entries: Vec<(String, String)>,
}

impl AnalysisSections {
    /// Parse analysis text into sections.
    pub fn parse(text: &str) -> Self {
        let mut sections = Self::default();
        let mut title: Option<String> = None;
        let mut body: Vec<&str> = Vec::new();

        for line in text.lines().map(str::trim) {
            if line.is_empty() {
                continue;
            }

            if is_section_header(line) {
                if let Some(prev) = title.take() {
                    sections.insert(prev, body.join("\n"));
                }
                title = Some(header_title(line));
                body.clear();
            } else {
                body.push(line);
            }
        }

        if let Some(last) = title {
            sections.insert(last, body.join("\n"));
        }

        sections
    }

    /// Insert or replace a section. Empty titles are ignored.
    pub fn insert(&mut self, title: String, body: String) {
        if title.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(t, _)| *t == title) {
            Some(entry) => entry.1 = body,
            None => self.entries.push((title, body)),
        }
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, b)| b.as_str())
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AnalysisSections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (title, body) in &self.entries {
            map.serialize_entry(title, body)?;
        }
        map.end()
    }
}

fn starts_numbered(line: &str) -> bool {
    NUMBERED_PREFIXES.iter().any(|p| line.starts_with(p))
}

fn is_section_header(line: &str) -> bool {
    (line.starts_with("**") && line.ends_with(":**")) || starts_numbered(line)
}

fn header_title(line: &str) -> String {
    let stripped: String = line.chars().filter(|c| *c != '*' && *c != ':').collect();
    let stripped = stripped.trim();

    if starts_numbered(stripped) {
        // prefix is two ASCII bytes
        stripped[2..].trim().to_string()
    } else {
        stripped.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emphasis_headers() {
        let sections = AnalysisSections::parse("**Snapshot:**\nLine A\n**Verdict:**\nLine B");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections.get("Snapshot"), Some("Line A"));
        assert_eq!(sections.get("Verdict"), Some("Line B"));
    }

    #[test]
    fn test_numbered_headers() {
        let sections = AnalysisSections::parse("1. Snapshot\nLine A\n2. Verdict\nLine B");
        assert_eq!(sections.get("Snapshot"), Some("Line A"));
        assert_eq!(sections.get("Verdict"), Some("Line B"));
    }

    #[test]
    fn test_emphasis_rule_checked_first() {
        let sections = AnalysisSections::parse("**1. Foo:**\nbody");
        assert_eq!(sections.titles().collect::<Vec<_>>(), vec!["Foo"]);
    }

    #[test]
    fn test_numbered_with_inline_emphasis() {
        let text = "1.  **IPO Snapshot:** Issue size 500 Cr\n- Price band 100-110";
        let sections = AnalysisSections::parse(text);
        assert_eq!(
            sections.get("IPO Snapshot Issue size 500 Cr"),
            Some("- Price band 100-110")
        );
    }

    #[test]
    fn test_preamble_and_blank_lines_dropped() {
        let text = "Here is the analysis.\n\n**Business Overview:**\n\n  Makes widgets.  \n\nSells them.\n";
        let sections = AnalysisSections::parse(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections.get("Business Overview"), Some("Makes widgets.\nSells them."));
    }

    #[test]
    fn test_repeated_title_overwrites_in_place() {
        let text = "**A:**\none\n**B:**\ntwo\n**A:**\nthree";
        let sections = AnalysisSections::parse(text);
        assert_eq!(sections.titles().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(sections.get("A"), Some("three"));
    }

    #[test]
    fn test_header_without_body() {
        let sections = AnalysisSections::parse("**Final Verdict:**");
        assert_eq!(sections.get("Final Verdict"), Some(""));
    }

    #[test]
    fn test_seven_is_not_a_header() {
        let sections = AnalysisSections::parse("**A:**\n7. not a header");
        assert_eq!(sections.get("A"), Some("7. not a header"));
    }

    #[test]
    fn test_empty_title_is_discarded() {
        let sections = AnalysisSections::parse("**:**\nlost\n**Kept:**\nbody");
        assert_eq!(sections.titles().collect::<Vec<_>>(), vec!["Kept"]);
    }

    #[test]
    fn test_serializes_in_order() {
        let sections = AnalysisSections::parse("**Zeta:**\nz\n**Alpha:**\na");
        let json = serde_json::to_string(&sections).unwrap();
        assert_eq!(json, r#"{"Zeta":"z","Alpha":"a"}"#);
    }
}
