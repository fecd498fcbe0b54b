//! Intent rules R004–R006, R010, and the intent classification shared with
//! the naming checker.

use crate::config::RuleConfig;
use crate::diagnostics::{Diagnostic, ResourceKind};
use crate::engine::{LintContext, RuleCode};
use crate::models::Intent;

/// Label keys/values that mark a head intent.
const HEAD_LABELS: &[&str] = &["head intent", "head"];

/// Training phrases that mark a confirmation intent.
const CONFIRMATION_PHRASES: &[&str] = &["yes", "no"];

/// Keywords that mark an escalation intent.
const ESCALATION_KEYWORDS: &[&str] = &["escalate", "operator"];

/// Category of an intent, evaluated once per lint run and cached on the
/// context. First matching category wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentClass {
    Head,
    Confirmation,
    Escalation,
    Generic,
}

/// Classify an intent.
///
/// Head: any label key or value equal to `head intent`/`head`, or a display
/// name matching the configured head-name pattern. Confirmation: any phrase
/// equal to `yes`/`no` after trimming. Escalation: any phrase containing
/// `escalate` or `operator`. All keyword matching is case-insensitive; the
/// verbatim matching of R007 is deliberately not reused here.
#[must_use]
pub fn classify(intent: &Intent, config: &RuleConfig) -> IntentClass {
    let labelled_head = intent.labels().iter().any(|(key, value)| {
        HEAD_LABELS
            .iter()
            .any(|l| key.eq_ignore_ascii_case(l) || value.eq_ignore_ascii_case(l))
    });
    if labelled_head || config.head_name_pattern.is_match(&intent.display_name) {
        return IntentClass::Head;
    }

    let phrases = || intent.training_phrases.iter().map(|tp| tp.text());
    if phrases().any(|p| {
        CONFIRMATION_PHRASES
            .iter()
            .any(|c| p.trim().eq_ignore_ascii_case(c))
    }) {
        return IntentClass::Confirmation;
    }
    if phrases().any(|p| {
        let lower = p.to_lowercase();
        ESCALATION_KEYWORDS.iter().any(|k| lower.contains(k))
    }) {
        return IntentClass::Escalation;
    }
    IntentClass::Generic
}

fn enabled_intents<'a>(
    context: &'a LintContext<'a>,
) -> impl Iterator<Item = (&'a Intent, IntentClass)> + 'a {
    context
        .tree
        .intents
        .iter()
        .zip(context.intent_classes.iter().copied())
        .filter(|(intent, _)| context.config.intent_enabled(&intent.display_name))
}

/// R004: an intent with zero training phrases cannot be matched by NLU.
pub fn missing_training_phrases(context: &LintContext) -> Vec<Diagnostic> {
    enabled_intents(context)
        .filter(|(intent, _)| intent.training_phrases.is_empty())
        .map(|(intent, _)| {
            Diagnostic::warning(
                RuleCode::R004,
                ResourceKind::Intent,
                &intent.display_name,
                format!(
                    "intent has no training phrases for language '{}'",
                    intent.language_code
                ),
            )
        })
        .collect()
}

/// R005: head intents need at least the configured head minimum of phrases.
/// An empty intent is R004's finding, not repeated here.
pub fn head_intent_minimum(context: &LintContext) -> Vec<Diagnostic> {
    let minimum = context.config.head_phrase_threshold;
    enabled_intents(context)
        .filter(|(intent, class)| {
            *class == IntentClass::Head
                && !intent.training_phrases.is_empty()
                && intent.training_phrases.len() < minimum
        })
        .map(|(intent, _)| {
            Diagnostic::warning(
                RuleCode::R005,
                ResourceKind::Intent,
                &intent.display_name,
                format!(
                    "head intent has {} training phrases, minimum is {minimum}",
                    intent.training_phrases.len()
                ),
            )
        })
        .collect()
}

/// R006: every non-head intent needs at least the general minimum of phrases.
pub fn general_intent_minimum(context: &LintContext) -> Vec<Diagnostic> {
    let minimum = context.config.general_phrase_threshold;
    enabled_intents(context)
        .filter(|(intent, class)| {
            *class != IntentClass::Head
                && !intent.training_phrases.is_empty()
                && intent.training_phrases.len() < minimum
        })
        .map(|(intent, _)| {
            Diagnostic::warning(
                RuleCode::R006,
                ResourceKind::Intent,
                &intent.display_name,
                format!(
                    "intent has {} training phrases, minimum is {minimum}",
                    intent.training_phrases.len()
                ),
            )
        })
        .collect()
}

/// R010: an intent without its companion metadata record is likely a
/// corrupted export.
pub fn missing_metadata(context: &LintContext) -> Vec<Diagnostic> {
    enabled_intents(context)
        .filter(|(intent, _)| intent.metadata.is_none())
        .map(|(intent, _)| {
            Diagnostic::error(
                RuleCode::R010,
                ResourceKind::Intent,
                &intent.display_name,
                "intent is missing its metadata record",
            )
        })
        .collect()
}
