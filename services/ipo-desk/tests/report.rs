//! Batch report tests.

use async_trait::async_trait;
use ipo_desk::{
    run_report, DeskSettings, IpoCache, IpoDesk, IpoKind, RenderError, Renderer, ReportSummary,
    SummarizeError, Summarizer, WaitFor,
};
use std::sync::Arc;
use std::time::Duration;

struct StaticRenderer {
    dashboard: &'static str,
}

#[async_trait]
impl Renderer for StaticRenderer {
    async fn render(
        &self,
        url: &str,
        wait_for: &WaitFor,
        _timeout: Duration,
    ) -> Result<String, RenderError> {
        match wait_for {
            WaitFor::TextInTag { .. } => Ok(self.dashboard.to_string()),
            WaitFor::ElementId(_) if url.contains("placeholder") => {
                Ok("<div id=\"main\"><p>Coming soon</p></div>".to_string())
            }
            WaitFor::ElementId(_) => {
                Ok("<div id=\"main\"><h2>About</h2><p>Makes widgets</p></div>".to_string())
            }
        }
    }
}

struct EchoSummarizer;

#[async_trait]
impl Summarizer for EchoSummarizer {
    fn name(&self) -> &str {
        "echo"
    }

    async fn summarize(&self, _prompt: &str) -> Result<String, SummarizeError> {
        Ok("**Final Verdict:**\nBased on the available data... fine.".to_string())
    }
}

fn desk(dashboard: &'static str) -> IpoDesk {
    IpoDesk::new(
        Arc::new(StaticRenderer { dashboard }),
        Arc::new(EchoSummarizer),
        IpoCache::default(),
        DeskSettings::default(),
    )
}

const DASHBOARD: &str = r#"<h2>Current IPOs (Mainboard)</h2>
<table><tbody>
  <tr><td><a href="/ipo/acme/1/">Acme Ltd</a></td><td></td><td></td><td>Current</td></tr>
  <tr><td><a href="/ipo/placeholder/2/">Blank Ltd</a></td><td></td><td></td><td>Upcoming</td></tr>
</tbody></table>"#;

#[tokio::test]
async fn test_report_covers_both_lists() {
    let desk = desk(DASHBOARD);
    let mut out = Vec::new();

    let summary = run_report(&desk, &IpoKind::ALL, Duration::ZERO, &mut out)
        .await
        .unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(
        summary,
        ReportSummary {
            analyzed: 1,
            failed: 1
        }
    );
    assert!(text.contains("Starting analysis for 1 CURRENT IPO(s)."));
    assert!(text.contains("ANALYZING CURRENT IPO: ACME LTD"));
    assert!(text.contains("Based on the available data... fine."));
    assert!(text.contains("ANALYZING UPCOMING IPO: BLANK LTD"));
    assert!(text.contains("Could not parse data from the detail page."));
    assert!(text.find("ACME LTD").unwrap() < text.find("BLANK LTD").unwrap());
}

#[tokio::test]
async fn test_report_single_kind() {
    let desk = desk(DASHBOARD);
    let mut out = Vec::new();

    let summary = run_report(&desk, &[IpoKind::Upcoming], Duration::ZERO, &mut out)
        .await
        .unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(summary.analyzed + summary.failed, 1);
    assert!(!text.contains("ACME LTD"));
}

#[tokio::test]
async fn test_report_with_no_ipos() {
    let desk = desk("<h2>Nothing here</h2>");
    let mut out = Vec::new();

    let summary = run_report(&desk, &IpoKind::ALL, Duration::ZERO, &mut out)
        .await
        .unwrap();

    assert_eq!(summary, ReportSummary::default());
    assert!(String::from_utf8(out)
        .unwrap()
        .contains("No current or upcoming IPOs found to analyze."));
}
