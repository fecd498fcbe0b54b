//! Voice response punctuation rules R001–R003.
//!
//! Voice agents read responses aloud, so punctuation drives prosody: the
//! text-to-speech pause for `?` differs from `.`. None of these rules apply
//! to chat agents.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::AgentType;
use crate::diagnostics::{Diagnostic, Location, ResourceKind};
use crate::engine::{LintContext, RuleCode};
use crate::graph::START_PAGE;
use crate::models::Fulfillment;

/// Interrogative words opening a wh-question.
const WH_WORDS: &[&str] = &["what", "who", "where", "when", "why", "how", "which"];

/// The alternative marker of a closed-choice construct (` or `, word-bounded).
static ALTERNATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bor\b").expect("alternative regex must compile"));

/// One fulfillment attachment point, with enough identity for reporting.
struct Site<'a> {
    flow: &'a str,
    page: &'a str,
    trigger: String,
    fulfillment: &'a Fulfillment,
    /// Attached to an event handler rather than a route/entry/prompt.
    event: bool,
    no_match: bool,
}

/// All fulfillment sites across enabled flows, in source order: flow-level
/// (start page) routes and handlers first, then each page's entry, routes,
/// handlers, and form prompts.
fn sites<'a>(context: &'a LintContext<'a>) -> Vec<Site<'a>> {
    let mut sites = Vec::new();
    for flow in &context.tree.flows {
        let flow_name = flow.display_name();
        if !context.config.flow_enabled(flow_name) {
            continue;
        }
        for route in &flow.record.transition_routes {
            if let Some(fulfillment) = &route.trigger_fulfillment {
                sites.push(Site {
                    flow: flow_name,
                    page: START_PAGE,
                    trigger: route.trigger(),
                    fulfillment,
                    event: false,
                    no_match: false,
                });
            }
        }
        for handler in &flow.record.event_handlers {
            if let Some(fulfillment) = &handler.trigger_fulfillment {
                sites.push(Site {
                    flow: flow_name,
                    page: START_PAGE,
                    trigger: format!("event:{}", handler.event),
                    fulfillment,
                    event: true,
                    no_match: handler.is_no_match(),
                });
            }
        }
        for page in &flow.pages {
            if let Some(fulfillment) = &page.entry_fulfillment {
                sites.push(Site {
                    flow: flow_name,
                    page: &page.display_name,
                    trigger: "entry".to_string(),
                    fulfillment,
                    event: false,
                    no_match: false,
                });
            }
            for route in &page.transition_routes {
                if let Some(fulfillment) = &route.trigger_fulfillment {
                    sites.push(Site {
                        flow: flow_name,
                        page: &page.display_name,
                        trigger: route.trigger(),
                        fulfillment,
                        event: false,
                        no_match: false,
                    });
                }
            }
            for handler in &page.event_handlers {
                if let Some(fulfillment) = &handler.trigger_fulfillment {
                    sites.push(Site {
                        flow: flow_name,
                        page: &page.display_name,
                        trigger: format!("event:{}", handler.event),
                        fulfillment,
                        event: true,
                        no_match: handler.is_no_match(),
                    });
                }
            }
            for parameter in page.form.iter().flat_map(|f| f.parameters.iter()) {
                let Some(behavior) = &parameter.fill_behavior else {
                    continue;
                };
                if let Some(fulfillment) = &behavior.initial_prompt_fulfillment {
                    sites.push(Site {
                        flow: flow_name,
                        page: &page.display_name,
                        trigger: format!("form:{}", parameter.display_name),
                        fulfillment,
                        event: false,
                        no_match: false,
                    });
                }
                for handler in &behavior.reprompt_event_handlers {
                    if let Some(fulfillment) = &handler.trigger_fulfillment {
                        sites.push(Site {
                            flow: flow_name,
                            page: &page.display_name,
                            trigger: format!("form:{}:event:{}", parameter.display_name, handler.event),
                            fulfillment,
                            event: true,
                            no_match: handler.is_no_match(),
                        });
                    }
                }
            }
        }
    }
    sites
}

fn finding(site: &Site, code: RuleCode, message: String, verbose: bool, text: &str) -> Diagnostic {
    let message = if verbose {
        format!("{message} ({}): \"{text}\"", site.trigger)
    } else {
        message
    };
    Diagnostic::warning(code, ResourceKind::Page, site.page, message)
        .at(Location::page(site.flow, site.page))
}

/// R001: closed-choice alternative punctuation.
///
/// A fulfillment whose ordered text variants form an enumerated closed-choice
/// construct (two or more variants, at least one carrying an ` or `
/// alternative) must end every variant except the last with `?` and the last
/// with `.` — the canonical `A? or B.` shape. A sole variant is never a
/// construct.
pub fn closed_choice(context: &LintContext) -> Vec<Diagnostic> {
    if context.config.agent_type != AgentType::Voice {
        return Vec::new();
    }
    let mut diagnostics = Vec::new();
    for site in sites(context) {
        let texts: Vec<&str> = site.fulfillment.texts().collect();
        if texts.len() < 2 || !texts.iter().any(|t| ALTERNATIVE_RE.is_match(t)) {
            continue;
        }
        let last = texts.len() - 1;
        for (index, text) in texts.iter().enumerate() {
            let trimmed = text.trim_end();
            if index < last && !trimmed.ends_with('?') {
                diagnostics.push(finding(
                    &site,
                    RuleCode::R001,
                    "closed-choice alternative missing intermediate '?'".to_string(),
                    context.verbose,
                    text,
                ));
            } else if index == last && !trimmed.ends_with('.') {
                diagnostics.push(finding(
                    &site,
                    RuleCode::R001,
                    "closed-choice final alternative must end with '.'".to_string(),
                    context.verbose,
                    text,
                ));
            }
        }
    }
    diagnostics
}

/// Returns `true` if the text opens with an interrogative word.
fn opens_with_wh(text: &str) -> bool {
    let Some(first) = text.split_whitespace().next() else {
        return false;
    };
    let first = first.trim_matches(|c: char| !c.is_alphanumeric());
    WH_WORDS.iter().any(|w| first.eq_ignore_ascii_case(w))
}

/// R002: a response opening with an interrogative word must end with `.`,
/// not `?`, so the voice does not rise on a rhetorical prompt. Event handler
/// responses are reactions, not prompts, and are not checked here; the
/// no-match case is R003's domain with the opposite punctuation.
pub fn wh_question(context: &LintContext) -> Vec<Diagnostic> {
    if context.config.agent_type != AgentType::Voice {
        return Vec::new();
    }
    let mut diagnostics = Vec::new();
    for site in sites(context) {
        if site.event {
            continue;
        }
        for text in site.fulfillment.texts() {
            if opens_with_wh(text) && text.trim_end().ends_with('?') {
                diagnostics.push(finding(
                    &site,
                    RuleCode::R002,
                    "wh-question should end with '.' instead of '?'".to_string(),
                    context.verbose,
                    text,
                ));
            }
        }
    }
    diagnostics
}

/// R003: a clarifying question inside a no-match handler must end with `?`.
/// Only question-shaped texts (opening with an interrogative word, ending
/// with `.`) are flagged; plain apology statements are fine.
pub fn clarifying_question(context: &LintContext) -> Vec<Diagnostic> {
    if context.config.agent_type != AgentType::Voice {
        return Vec::new();
    }
    let mut diagnostics = Vec::new();
    for site in sites(context) {
        if !site.no_match {
            continue;
        }
        for text in site.fulfillment.texts() {
            if opens_with_wh(text) && text.trim_end().ends_with('.') {
                diagnostics.push(finding(
                    &site,
                    RuleCode::R003,
                    "clarifying question in no-match handler should end with '?'".to_string(),
                    context.verbose,
                    text,
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
        EventHandler, Flow, FlowRecord, Page, ResourceTree, ResponseMessage, Route, TextMessage,
    };

    fn fulfillment(texts: &[&str]) -> Fulfillment {
        Fulfillment {
            messages: vec![ResponseMessage {
                text: Some(TextMessage {
                    text: texts.iter().map(|t| (*t).to_string()).collect(),
                }),
            }],
            ..Fulfillment::default()
        }
    }

    fn tree_with_entry(texts: &[&str]) -> ResourceTree {
        ResourceTree {
            flows: vec![Flow {
                record: FlowRecord {
                    display_name: "Main".to_string(),
                    ..FlowRecord::default()
                },
                pages: vec![Page {
                    display_name: "Ask".to_string(),
                    entry_fulfillment: Some(fulfillment(texts)),
                    ..Page::default()
                }],
            }],
            ..ResourceTree::default()
        }
    }

    fn voice_config() -> RuleConfig {
        crate::config::parse_config("agent_type: voice").unwrap()
    }

    fn run(
        tree: &ResourceTree,
        config: &RuleConfig,
        check: fn(&LintContext) -> Vec<Diagnostic>,
    ) -> Vec<Diagnostic> {
        let graph = AgentGraph::build(tree, config);
        let context = LintContext::new(tree, config, &graph, false);
        check(&context)
    }

    // ── R001 ───────────────────────────────────────────────────────────

    #[test]
    fn r001_sole_variant_is_never_a_construct() {
        let tree = tree_with_entry(&["Do you prefer A or B?"]);
        assert!(run(&tree, &voice_config(), closed_choice).is_empty());
    }

    #[test]
    fn r001_final_variant_missing_period() {
        let tree = tree_with_entry(&["Would you like A?", "Do you prefer A or B"]);
        let diagnostics = run(&tree, &voice_config(), closed_choice);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, RuleCode::R001);
        assert!(diagnostics[0].message.contains("final"));
    }

    #[test]
    fn r001_intermediate_missing_question_mark() {
        let tree = tree_with_entry(&["Would you like A", "or maybe B."]);
        let diagnostics = run(&tree, &voice_config(), closed_choice);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("intermediate"));
    }

    #[test]
    fn r001_well_formed_construct_passes() {
        let tree = tree_with_entry(&["Would you like A?", "or B."]);
        assert!(run(&tree, &voice_config(), closed_choice).is_empty());
    }

    #[test]
    fn r001_multi_variant_without_alternative_marker_ignored() {
        let tree = tree_with_entry(&["Hello there", "Welcome back"]);
        assert!(run(&tree, &voice_config(), closed_choice).is_empty());
    }

    #[test]
    fn r001_chat_agent_not_checked() {
        let tree = tree_with_entry(&["Would you like A", "or B"]);
        assert!(run(&tree, &RuleConfig::default(), closed_choice).is_empty());
    }

    // ── R002 ───────────────────────────────────────────────────────────

    #[test]
    fn r002_wh_question_ending_with_question_mark() {
        let tree = tree_with_entry(&["What is your order number?"]);
        let diagnostics = run(&tree, &voice_config(), wh_question);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, RuleCode::R002);
    }

    #[test]
    fn r002_wh_question_ending_with_period_passes() {
        let tree = tree_with_entry(&["What is your order number."]);
        assert!(run(&tree, &voice_config(), wh_question).is_empty());
    }

    #[test]
    fn r002_wh_word_case_insensitive() {
        let tree = tree_with_entry(&["WHERE should we ship it?"]);
        assert_eq!(run(&tree, &voice_config(), wh_question).len(), 1);
    }

    #[test]
    fn r002_non_wh_question_ignored() {
        let tree = tree_with_entry(&["Are you ready?"]);
        assert!(run(&tree, &voice_config(), wh_question).is_empty());
    }

    #[test]
    fn r002_wh_word_mid_sentence_ignored() {
        let tree = tree_with_entry(&["Tell me what you need?"]);
        assert!(run(&tree, &voice_config(), wh_question).is_empty());
    }

    // ── R003 ───────────────────────────────────────────────────────────

    fn tree_with_no_match(texts: &[&str]) -> ResourceTree {
        ResourceTree {
            flows: vec![Flow {
                record: FlowRecord {
                    display_name: "Main".to_string(),
                    ..FlowRecord::default()
                },
                pages: vec![Page {
                    display_name: "Ask".to_string(),
                    event_handlers: vec![EventHandler {
                        event: "sys.no-match-default".to_string(),
                        trigger_fulfillment: Some(fulfillment(texts)),
                        ..EventHandler::default()
                    }],
                    ..Page::default()
                }],
            }],
            ..ResourceTree::default()
        }
    }

    #[test]
    fn r003_wh_clarifier_ending_with_period_flagged() {
        let tree = tree_with_no_match(&["What did you mean."]);
        let diagnostics = run(&tree, &voice_config(), clarifying_question);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, RuleCode::R003);
    }

    #[test]
    fn r003_no_match_question_passes() {
        let tree = tree_with_no_match(&["What did you mean?"]);
        assert!(run(&tree, &voice_config(), clarifying_question).is_empty());
    }

    #[test]
    fn r003_plain_statement_ignored() {
        let tree = tree_with_no_match(&["Sorry, I did not get that."]);
        assert!(run(&tree, &voice_config(), clarifying_question).is_empty());
    }

    #[test]
    fn r003_only_no_match_handlers_checked() {
        let mut tree = tree_with_no_match(&["What did you mean?"]);
        tree.flows[0].pages[0].event_handlers.push(EventHandler {
            event: "sys.no-input-default".to_string(),
            trigger_fulfillment: Some(fulfillment(&["Who is still there."])),
            ..EventHandler::default()
        });
        assert!(run(&tree, &voice_config(), clarifying_question).is_empty());
    }

    #[test]
    fn no_match_wh_clarifier_satisfies_both_punctuation_rules() {
        // The same no-match text must not be caught between R002 and R003:
        // the '?' form passes both, the '.' form is R003's finding alone.
        let question = tree_with_no_match(&["What did you mean?"]);
        assert!(run(&question, &voice_config(), wh_question).is_empty());
        assert!(run(&question, &voice_config(), clarifying_question).is_empty());

        let statement = tree_with_no_match(&["What did you mean."]);
        assert!(run(&statement, &voice_config(), wh_question).is_empty());
        assert_eq!(
            run(&statement, &voice_config(), clarifying_question).len(),
            1
        );
    }

    // ── Shared walker ──────────────────────────────────────────────────

    #[test]
    fn flow_level_routes_are_start_page_sites() {
        let tree = ResourceTree {
            flows: vec![Flow {
                record: FlowRecord {
                    display_name: "Main".to_string(),
                    transition_routes: vec![Route {
                        intent: Some("greet".to_string()),
                        trigger_fulfillment: Some(fulfillment(&[
                            "What can I do for you today?",
                        ])),
                        ..Route::default()
                    }],
                    ..FlowRecord::default()
                },
                pages: vec![],
            }],
            ..ResourceTree::default()
        };
        let diagnostics = run(&tree, &voice_config(), wh_question);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].display_name, START_PAGE);
        assert_eq!(
            diagnostics[0].location.as_ref().unwrap().to_string(),
            "Main:START_PAGE"
        );
    }

    #[test]
    fn verbose_carries_text_into_message() {
        let tree = tree_with_entry(&["What is your order number?"]);
        let config = voice_config();
        let graph = AgentGraph::build(&tree, &config);
        let context = LintContext::new(&tree, &config, &graph, true);
        let diagnostics = wh_question(&context);
        assert!(
            diagnostics[0].message.contains("What is your order number?"),
            "got: {}",
            diagnostics[0].message
        );
    }

    #[test]
    fn excluded_flow_produces_no_sites() {
        let tree = tree_with_entry(&["What is your order number?"]);
        let mut config = voice_config();
        config.exclude_flows.push("Main".to_string());
        assert!(run(&tree, &config, wh_question).is_empty());
    }
}
