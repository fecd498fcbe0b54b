//! Naming convention rule R015.
//!
//! Each resource is classified into exactly one naming subtype, and only the
//! pattern configured for that subtype applies. Pages: form-bearing beats
//! webhook-bearing beats generic. Intents: head beats confirmation beats
//! escalation beats generic.

use crate::checkers::intents::IntentClass;
use crate::config::{NamingRule, NamingSubtype};
use crate::diagnostics::{Diagnostic, Location, ResourceKind};
use crate::engine::{LintContext, RuleCode};
use crate::models::Page;

fn pattern_for<'a>(context: &'a LintContext, subtype: NamingSubtype) -> Option<&'a NamingRule> {
    context.config.naming.iter().find(|r| r.subtype == subtype)
}

fn page_subtype(page: &Page) -> NamingSubtype {
    if page.has_form() {
        NamingSubtype::PageWithForm
    } else if page.references_webhook() {
        NamingSubtype::PageWithWebhook
    } else {
        NamingSubtype::PageGeneric
    }
}

fn intent_subtype(class: IntentClass) -> NamingSubtype {
    match class {
        IntentClass::Head => NamingSubtype::IntentHead,
        IntentClass::Confirmation => NamingSubtype::IntentConfirmation,
        IntentClass::Escalation => NamingSubtype::IntentEscalation,
        IntentClass::Generic => NamingSubtype::IntentGeneric,
    }
}

fn check_name(
    rule: &NamingRule,
    resource: ResourceKind,
    display_name: &str,
    location: Option<Location>,
) -> Option<Diagnostic> {
    if rule.pattern.is_match(display_name) {
        return None;
    }
    let mut diagnostic = Diagnostic::warning(
        RuleCode::R015,
        resource,
        display_name,
        format!(
            "{} name does not match naming pattern '{}'",
            rule.subtype.as_str(),
            rule.raw
        ),
    );
    if let Some(location) = location {
        diagnostic = diagnostic.at(location);
    }
    Some(diagnostic)
}

/// R015: test every configured subtype pattern against the display names of
/// resources classified under it. One naming check per resource, at most.
pub fn naming_conventions(context: &LintContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let config = context.config;

    if config.resource_enabled(ResourceKind::Agent) {
        if let Some(rule) = pattern_for(context, NamingSubtype::Agent) {
            if !context.tree.display_name.is_empty() {
                diagnostics.extend(check_name(
                    rule,
                    ResourceKind::Agent,
                    &context.tree.display_name,
                    None,
                ));
            }
        }
    }

    if config.resource_enabled(ResourceKind::Flow) {
        if let Some(rule) = pattern_for(context, NamingSubtype::Flow) {
            for flow in &context.tree.flows {
                if !config.flow_enabled(flow.display_name()) {
                    continue;
                }
                diagnostics.extend(check_name(
                    rule,
                    ResourceKind::Flow,
                    flow.display_name(),
                    Some(Location::flow(flow.display_name())),
                ));
            }
        }
    }

    if config.resource_enabled(ResourceKind::Page) {
        for flow in &context.tree.flows {
            if !config.flow_enabled(flow.display_name()) {
                continue;
            }
            for page in &flow.pages {
                let Some(rule) = pattern_for(context, page_subtype(page)) else {
                    continue;
                };
                diagnostics.extend(check_name(
                    rule,
                    ResourceKind::Page,
                    &page.display_name,
                    Some(Location::page(flow.display_name(), &page.display_name)),
                ));
            }
        }
    }

    if config.resource_enabled(ResourceKind::Intent) {
        for (intent, class) in context
            .tree
            .intents
            .iter()
            .zip(context.intent_classes.iter())
        {
            if !config.intent_enabled(&intent.display_name) {
                continue;
            }
            let Some(rule) = pattern_for(context, intent_subtype(*class)) else {
                continue;
            };
            diagnostics.extend(check_name(
                rule,
                ResourceKind::Intent,
                &intent.display_name,
                None,
            ));
        }
    }

    if config.resource_enabled(ResourceKind::EntityType) {
        if let Some(rule) = pattern_for(context, NamingSubtype::EntityType) {
            for entity_type in &context.tree.entity_types {
                diagnostics.extend(check_name(
                    rule,
                    ResourceKind::EntityType,
                    &entity_type.display_name,
                    None,
                ));
            }
        }
    }

    if config.resource_enabled(ResourceKind::Webhook) {
        if let Some(rule) = pattern_for(context, NamingSubtype::Webhook) {
            for webhook in &context.tree.webhooks {
                diagnostics.extend(check_name(
                    rule,
                    ResourceKind::Webhook,
                    &webhook.display_name,
                    None,
                ));
            }
        }
    }

    if config.resource_enabled(ResourceKind::TestCase) {
        if let Some(rule) = pattern_for(context, NamingSubtype::TestCase) {
            for test_case in &context.tree.test_cases {
                if !config.test_case_enabled(&test_case.display_name, &test_case.tags) {
                    continue;
                }
                diagnostics.extend(check_name(
                    rule,
                    ResourceKind::TestCase,
                    &test_case.display_name,
                    None,
                ));
            }
        }
    }

    diagnostics
}
