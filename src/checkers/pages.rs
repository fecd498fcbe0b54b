//! Reachability rules R012–R014: one diagnostic per defective page.
//!
//! These consume the annotations computed by the graph pass directly.
//! Webhook-driven routing can keep a structurally dead page alive, so pages
//! listed in the config's reachability exemptions are skipped.

use crate::diagnostics::{Diagnostic, Location, ResourceKind};
use crate::engine::{LintContext, RuleCode};
use crate::graph::PageClass;

fn classified(context: &LintContext, wanted: PageClass, code: RuleCode, message: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for flow in &context.graph.flows {
        for node in &flow.nodes {
            if node.exempt || node.class() != wanted {
                continue;
            }
            diagnostics.push(
                Diagnostic::warning(
                    code,
                    ResourceKind::Page,
                    node.display_name.clone(),
                    message,
                )
                .at(Location::page(&flow.flow_name, &node.display_name)),
            );
        }
    }
    diagnostics
}

/// R012: page has incoming transitions but no way out.
pub fn dangling(context: &LintContext) -> Vec<Diagnostic> {
    classified(
        context,
        PageClass::Dangling,
        RuleCode::R012,
        "page can be entered but has no outgoing transition",
    )
}

/// R013: page transitions out but nothing transitions to it.
pub fn unreachable(context: &LintContext) -> Vec<Diagnostic> {
    classified(
        context,
        PageClass::Unreachable,
        RuleCode::R013,
        "page has outgoing transitions but nothing routes to it",
    )
}

/// R014: page has no transitions at all.
pub fn unused(context: &LintContext) -> Vec<Diagnostic> {
    classified(
        context,
        PageClass::Unused,
        RuleCode::R014,
        "page has no incoming or outgoing transitions",
    )
}
