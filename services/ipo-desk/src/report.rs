//! Batch report: analyze every listed IPO in turn and print the results.

use std::io::Write;
use std::time::Duration;

use crate::desk::IpoDesk;
use crate::error::DeskError;
use crate::model::IpoKind;

/// Outcome counts for a report run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub analyzed: usize,
    pub failed: usize,
}

/// Analyze each IPO of each `kind` in order, pausing between IPOs.
///
/// Per-IPO failures are printed and the run continues.
pub async fn run_report<W: Write>(
    desk: &IpoDesk,
    kinds: &[IpoKind],
    pause: Duration,
    out: &mut W,
) -> std::io::Result<ReportSummary> {
    let snapshot = desk.listings().await;
    let listings = snapshot.listings;
    let mut summary = ReportSummary::default();

    if listings.is_empty() {
        writeln!(out, "\nNo current or upcoming IPOs found to analyze. Exiting.")?;
        return Ok(summary);
    }

    let total: usize = kinds.iter().map(|k| listings.of(*k).len()).sum();
    let mut done = 0;

    for &kind in kinds {
        let ipos = listings.of(kind);
        if ipos.is_empty() {
            writeln!(out, "\nNo {kind} IPOs found to analyze.")?;
            continue;
        }

        writeln!(out, "\n{}", "=".repeat(80))?;
        writeln!(
            out,
            "Starting analysis for {} {} IPO(s).",
            ipos.len(),
            kind.label()
        )?;
        writeln!(out, "{}", "=".repeat(80))?;

        for (index, ipo) in ipos.iter().enumerate() {
            let name = ipo.name.to_uppercase();
            writeln!(out, "\n\nANALYZING {} IPO: {name}", kind.label())?;
            writeln!(out, "{}", "-".repeat(50))?;

            match desk.analyze(kind, index).await {
                Ok(record) => {
                    summary.analyzed += 1;
                    writeln!(out, "\n{}", "#".repeat(80))?;
                    writeln!(out, "          ANALYSIS FOR {} IPO: {name}", kind.label())?;
                    writeln!(out, "{}\n", "#".repeat(80))?;
                    writeln!(out, "{}", record.raw_analysis)?;
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(kind = %kind, index, error = %e, "Report entry failed");
                    writeln!(out, "{}", failure_message(&e))?;
                }
            }
            out.flush()?;

            done += 1;
            if done < total && !pause.is_zero() {
                writeln!(
                    out,
                    "\n--- Pausing for {} seconds before next IPO ---",
                    pause.as_secs()
                )?;
                out.flush()?;
                tokio::time::sleep(pause).await;
            }
        }
    }

    tracing::info!(
        analyzed = summary.analyzed,
        failed = summary.failed,
        "Report finished"
    );
    Ok(summary)
}

fn failure_message(err: &DeskError) -> String {
    match err {
        DeskError::DetailUnavailable => "Could not retrieve the detail page HTML.".to_string(),
        DeskError::DetailUnparsable => {
            "Could not parse data from the detail page. It may be a placeholder page.".to_string()
        }
        other => format!("Analysis failed: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            failure_message(&DeskError::DetailUnavailable),
            "Could not retrieve the detail page HTML."
        );
        assert!(failure_message(&DeskError::Internal("boom".to_string())).contains("boom"));
    }
}
