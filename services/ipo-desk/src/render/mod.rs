//! Page rendering.
//!
//! The listings and detail pages are built client-side, so a plain HTTP
//! fetch is not enough: a [`Renderer`] loads the page in a real browser and
//! hands back the DOM once a marker shows up.

pub mod chrome;

pub use chrome::ChromeRenderer;

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Render failures.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Timed out waiting for {marker} on {url}")]
    Timeout { url: String, marker: String },

    #[error("Navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Browser protocol error: {0}")]
    Protocol(String),
}

impl RenderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RenderError::Timeout { .. })
    }
}

/// DOM condition that marks a page as ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitFor {
    /// An element with this id exists.
    ElementId(String),
    /// Some `tag` element's text contains `text`.
    TextInTag { tag: String, text: String },
}

impl WaitFor {
    pub fn element_id(id: impl Into<String>) -> Self {
        WaitFor::ElementId(id.into())
    }

    pub fn text_in_tag(tag: impl Into<String>, text: impl Into<String>) -> Self {
        WaitFor::TextInTag {
            tag: tag.into(),
            text: text.into(),
        }
    }

    /// JavaScript expression evaluating to `true` once the marker is present.
    pub fn probe_script(&self) -> String {
        match self {
            WaitFor::ElementId(id) => {
                format!("document.getElementById({}) !== null", js_string(id))
            }
            WaitFor::TextInTag { tag, text } => format!(
                "Array.from(document.getElementsByTagName({})).some(e => (e.textContent || '').includes({}))",
                js_string(tag),
                js_string(text)
            ),
        }
    }
}

impl fmt::Display for WaitFor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitFor::ElementId(id) => write!(f, "#{id}"),
            WaitFor::TextInTag { tag, text } => write!(f, "<{tag}> containing \"{text}\""),
        }
    }
}

fn js_string(value: &str) -> String {
    // JSON string literals are valid JS string literals
    serde_json::Value::String(value.to_string()).to_string()
}

/// Loads a URL and returns its HTML once `wait_for` is satisfied.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(
        &self,
        url: &str,
        wait_for: &WaitFor,
        timeout: Duration,
    ) -> Result<String, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_script_escapes_text() {
        let wait = WaitFor::text_in_tag("h2", "Current IPOs \"(Mainboard)\"");
        let script = wait.probe_script();
        assert!(script.contains(r#"getElementsByTagName("h2")"#));
        assert!(script.contains(r#"includes("Current IPOs \"(Mainboard)\"")"#));
    }

    #[test]
    fn test_probe_script_element_id() {
        assert_eq!(
            WaitFor::element_id("main").probe_script(),
            r#"document.getElementById("main") !== null"#
        );
    }

    #[test]
    fn test_wait_for_display() {
        assert_eq!(WaitFor::element_id("main").to_string(), "#main");
        assert_eq!(
            WaitFor::text_in_tag("h2", "Mainboard").to_string(),
            "<h2> containing \"Mainboard\""
        );
    }

    #[test]
    fn test_timeout_detection() {
        let err = RenderError::Timeout {
            url: "https://example.com".to_string(),
            marker: "#main".to_string(),
        };
        assert!(err.is_timeout());
        assert!(!RenderError::Launch("no chrome".to_string()).is_timeout());
    }
}
