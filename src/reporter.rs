//! Rendering of a [`LintReport`] for the terminal or for tooling.
//!
//! The core hands over diagnostics and counts; everything about presentation
//! lives here.

use std::fmt::Write as _;

use crate::engine::LintReport;

/// Output format for a lint report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// The full report as a JSON object.
    Json,
}

/// Render a report in the requested format.
#[must_use]
pub fn render(report: &LintReport, format: ReportFormat) -> String {
    match format {
        ReportFormat::Text => render_text(report),
        ReportFormat::Json => {
            serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

fn render_text(report: &LintReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "===== linting agent '{}' =====", report.agent);
    for diagnostic in &report.diagnostics {
        let _ = writeln!(out, "{diagnostic}");
    }

    let s = &report.summary;
    let _ = writeln!(out, "{}", "-".repeat(20));
    let _ = writeln!(
        out,
        "{} flows, {} pages, {} intents, {} entity types, {} webhooks, {} test cases linted.",
        s.flows, s.pages, s.intents, s.entity_types, s.webhooks, s.test_cases
    );
    let _ = writeln!(
        out,
        "{} issues ({} errors, {} warnings) found out of {} resources inspected.",
        s.errors + s.warnings,
        s.errors,
        s.warnings,
        s.inspected
    );
    let _ = writeln!(out, "Your agent rated at {:.2}/10.0", s.rating);
    out
}
