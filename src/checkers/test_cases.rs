//! Test-case cross-validation rules R007–R008.
//!
//! These catch the silent drift between a test suite and the intents it
//! exercises: a turn that expects an intent the agent no longer has, or an
//! utterance that no longer appears verbatim in the intent's phrases.

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, ResourceKind};
use crate::engine::{LintContext, RuleCode};
use crate::models::{Intent, TestCase};

fn intents_by_name<'a>(context: &'a LintContext<'a>) -> HashMap<&'a str, &'a Intent> {
    context
        .tree
        .intents
        .iter()
        .map(|i| (i.display_name.as_str(), i))
        .collect()
}

fn enabled_test_cases<'a>(
    context: &'a LintContext<'a>,
) -> impl Iterator<Item = &'a TestCase> + 'a {
    context
        .tree
        .test_cases
        .iter()
        .filter(|tc| context.config.test_case_enabled(&tc.display_name, &tc.tags))
}

/// R007: the turn utterance must appear verbatim (case-sensitive,
/// `EXACT_MATCH` semantics) among the referenced intent's training phrases.
/// Turns whose intent reference is itself unresolvable are R008's findings
/// and skipped here.
pub fn explicit_phrase_match(context: &LintContext) -> Vec<Diagnostic> {
    let intents = intents_by_name(context);
    let mut diagnostics = Vec::new();
    for test_case in enabled_test_cases(context) {
        for (index, turn) in test_case.test_case_conversation_turns.iter().enumerate() {
            let Some(triggered) = turn
                .virtual_agent_output
                .as_ref()
                .and_then(|o| o.triggered_intent.as_ref())
            else {
                continue;
            };
            let Some(intent) = intents.get(triggered.display_name.as_str()) else {
                continue;
            };
            let Some(utterance) = turn.user_input.as_ref().and_then(|u| u.utterance()) else {
                continue;
            };
            let matched = intent
                .training_phrases
                .iter()
                .any(|tp| tp.text() == utterance);
            if !matched {
                diagnostics.push(Diagnostic::warning(
                    RuleCode::R007,
                    ResourceKind::TestCase,
                    &test_case.display_name,
                    format!(
                        "turn {}: utterance \"{utterance}\" is not a training phrase of intent '{}'",
                        index + 1,
                        triggered.display_name
                    ),
                ));
            }
        }
    }
    diagnostics
}

/// R008: the turn references an intent that does not exist.
pub fn invalid_intent_reference(context: &LintContext) -> Vec<Diagnostic> {
    let intents = intents_by_name(context);
    let mut diagnostics = Vec::new();
    for test_case in enabled_test_cases(context) {
        for (index, turn) in test_case.test_case_conversation_turns.iter().enumerate() {
            let Some(triggered) = turn
                .virtual_agent_output
                .as_ref()
                .and_then(|o| o.triggered_intent.as_ref())
            else {
                continue;
            };
            if !intents.contains_key(triggered.display_name.as_str()) {
                diagnostics.push(Diagnostic::warning(
                    RuleCode::R008,
                    ResourceKind::TestCase,
                    &test_case.display_name,
                    format!(
                        "turn {}: references unknown intent '{}'",
                        index + 1,
                        triggered.display_name
                    ),
                ));
            }
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;
    use crate::graph::AgentGraph;
    use crate::models::{
        ConversationTurn, InputText, IntentMetadata, PhrasePart, ResourceTree, TextMessage,
        TrainingPhrase, TriggeredIntent, UserInput, VirtualAgentOutput,
    };

    fn intent(name: &str, phrases: &[&str]) -> Intent {
        Intent {
            display_name: name.to_string(),
            metadata: Some(IntentMetadata::default()),
            training_phrases: phrases
                .iter()
                .map(|p| TrainingPhrase {
                    parts: vec![PhrasePart {
                        text: (*p).to_string(),
                        parameter_id: None,
                    }],
                    repeat_count: None,
                })
                .collect(),
            language_code: "en".to_string(),
        }
    }

    fn turn(utterance: &str, intent: &str) -> ConversationTurn {
        ConversationTurn {
            user_input: Some(UserInput {
                input: Some(InputText {
                    text: Some(TextMessage {
                        text: vec![utterance.to_string()],
                    }),
                }),
            }),
            virtual_agent_output: Some(VirtualAgentOutput {
                triggered_intent: Some(TriggeredIntent {
                    name: None,
                    display_name: intent.to_string(),
                }),
            }),
        }
    }

    fn test_case(name: &str, turns: Vec<ConversationTurn>) -> TestCase {
        TestCase {
            name: None,
            display_name: name.to_string(),
            tags: vec![],
            test_case_conversation_turns: turns,
        }
    }

    fn run(
        intents: Vec<Intent>,
        test_cases: Vec<TestCase>,
        config: &RuleConfig,
        check: fn(&LintContext) -> Vec<Diagnostic>,
    ) -> Vec<Diagnostic> {
        let tree = ResourceTree {
            intents,
            test_cases,
            ..ResourceTree::default()
        };
        let graph = AgentGraph::build(&tree, config);
        let context = LintContext::new(&tree, config, &graph, false);
        check(&context)
    }

    #[test]
    fn r007_verbatim_match_passes() {
        let diagnostics = run(
            vec![intent("book_flight", &["book a flight"])],
            vec![test_case("happy path", vec![turn("book a flight", "book_flight")])],
            &RuleConfig::default(),
            explicit_phrase_match,
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn r007_single_character_drift_flagged() {
        let diagnostics = run(
            vec![intent("book_flight", &["book a flight"])],
            vec![test_case("drifted", vec![turn("book a flighT", "book_flight")])],
            &RuleConfig::default(),
            explicit_phrase_match,
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, RuleCode::R007);
        assert!(diagnostics[0].message.contains("turn 1"));
    }

    #[test]
    fn r007_is_case_sensitive() {
        let diagnostics = run(
            vec![intent("book_flight", &["Book a flight"])],
            vec![test_case("cased", vec![turn("book a flight", "book_flight")])],
            &RuleConfig::default(),
            explicit_phrase_match,
        );
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn r007_skips_unresolvable_intent_references() {
        let diagnostics = run(
            vec![],
            vec![test_case("gone", vec![turn("anything", "deleted_intent")])],
            &RuleConfig::default(),
            explicit_phrase_match,
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn r008_unknown_intent_flagged() {
        let diagnostics = run(
            vec![intent("book_flight", &["book a flight"])],
            vec![test_case("gone", vec![turn("anything", "deleted_intent")])],
            &RuleConfig::default(),
            invalid_intent_reference,
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, RuleCode::R008);
        assert!(diagnostics[0].message.contains("deleted_intent"));
    }

    #[test]
    fn r008_known_intent_passes() {
        let diagnostics = run(
            vec![intent("book_flight", &[])],
            vec![test_case("fine", vec![turn("anything", "book_flight")])],
            &RuleConfig::default(),
            invalid_intent_reference,
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn turns_without_intent_reference_ignored() {
        let bare_turn = ConversationTurn::default();
        let diagnostics = run(
            vec![],
            vec![test_case("bare", vec![bare_turn])],
            &RuleConfig::default(),
            invalid_intent_reference,
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn tag_filter_skips_test_cases() {
        let config = crate::config::parse_config("test_cases:\n  tags: [\"#smoke\"]\n").unwrap();
        let diagnostics = run(
            vec![],
            vec![test_case("untagged", vec![turn("x", "missing")])],
            &config,
            invalid_intent_reference,
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn multiple_turns_report_positions() {
        let diagnostics = run(
            vec![intent("a", &["hello"])],
            vec![test_case(
                "multi",
                vec![turn("hello", "a"), turn("goodbye", "a")],
            )],
            &RuleConfig::default(),
            explicit_phrase_match,
        );
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("turn 2"));
    }
}
