//! Entity type rule R009.

use crate::diagnostics::{Diagnostic, ResourceKind};
use crate::engine::{LintContext, RuleCode};
use crate::models::EntityType;

/// Affirmative/negative tokens. An entity type whose entries never leave this
/// set is a yes/no capture that belongs in intents, where the NLU handles
/// phrasing variants far better than entity matching does.
const YES_NO_TOKENS: &[&str] = &[
    "yes", "no", "yeah", "yep", "yup", "nope", "nah", "y", "n", "true", "false", "ok", "okay",
];

fn is_yes_no(entity_type: &EntityType) -> bool {
    if entity_type.entities.is_empty() {
        return false;
    }
    entity_type.entities.iter().all(|entry| {
        std::iter::once(&entry.value)
            .chain(entry.synonyms.iter())
            .all(|token| {
                YES_NO_TOKENS
                    .iter()
                    .any(|t| token.trim().eq_ignore_ascii_case(t))
            })
    })
}

/// R009: flag entity types that only capture yes/no answers.
pub fn yes_no_entity(context: &LintContext) -> Vec<Diagnostic> {
    context
        .tree
        .entity_types
        .iter()
        .filter(|et| is_yes_no(et))
        .map(|et| {
            Diagnostic::warning(
                RuleCode::R009,
                ResourceKind::EntityType,
                &et.display_name,
                "entity type only captures yes/no answers; use confirmation intents instead",
            )
        })
        .collect()
}
