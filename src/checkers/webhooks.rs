//! Webhook rule R011.
//!
//! A webhook can time out or fail; without an error handler the conversation
//! silently stalls. Any page whose fulfillments reference a webhook needs at
//! least one handler bound to a `webhook.error` event category.

use crate::diagnostics::{Diagnostic, Location, ResourceKind};
use crate::engine::{LintContext, RuleCode};
use crate::graph::START_PAGE;

/// R011: flag pages (including flow start pages) that call a webhook but
/// have no webhook-error handler.
pub fn missing_error_handler(context: &LintContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for flow in &context.tree.flows {
        let flow_name = flow.display_name();
        if !context.config.flow_enabled(flow_name) {
            continue;
        }

        // The flow record is the start page: its route fulfillments can call
        // webhooks and its event handlers are where the guard must live.
        let start_calls_webhook = flow
            .record
            .transition_routes
            .iter()
            .filter_map(|r| r.trigger_fulfillment.as_ref())
            .chain(
                flow.record
                    .event_handlers
                    .iter()
                    .filter_map(|e| e.trigger_fulfillment.as_ref()),
            )
            .any(|f| f.webhook.is_some());
        let start_handled = flow
            .record
            .event_handlers
            .iter()
            .any(|e| e.is_webhook_error());
        if start_calls_webhook && !start_handled {
            diagnostics.push(
                Diagnostic::warning(
                    RuleCode::R011,
                    ResourceKind::Page,
                    START_PAGE,
                    "start page references a webhook but has no webhook error handler",
                )
                .at(Location::page(flow_name, START_PAGE)),
            );
        }

        for page in &flow.pages {
            if page.references_webhook()
                && !page.all_event_handlers().any(|e| e.is_webhook_error())
            {
                diagnostics.push(
                    Diagnostic::warning(
                        RuleCode::R011,
                        ResourceKind::Page,
                        &page.display_name,
                        "page references a webhook but has no webhook error handler",
                    )
                    .at(Location::page(flow_name, &page.display_name)),
                );
            }
        }
    }
    diagnostics
}
