//! The rule engine: a fixed registry of checkers dispatched over one
//! immutable snapshot of the agent.
//!
//! Rules run in registration order and each rule reports findings in
//! discovery order, so output is deterministic and diffable across runs on
//! unchanged input. A panicking checker is isolated: it yields a single
//! `R000` finding and every other checker still runs.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;

use serde::Serialize;

use crate::checkers::{entity_types, intents, naming, pages, responses, test_cases, webhooks};
use crate::checkers::intents::IntentClass;
use crate::config::RuleConfig;
use crate::diagnostics::{Diagnostic, ResourceKind, Severity};
use crate::graph::AgentGraph;
use crate::models::ResourceTree;

/// Stable rule codes.
///
/// The set is fixed at compile time; configuration only toggles membership,
/// it never introduces new codes at runtime. `R000` is reserved for
/// infrastructure findings: data-integrity defects discovered during graph
/// construction and checker-internal faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RuleCode {
    R000,
    R001,
    R002,
    R003,
    R004,
    R005,
    R006,
    R007,
    R008,
    R009,
    R010,
    R011,
    R012,
    R013,
    R014,
    R015,
}

impl RuleCode {
    /// Short human-readable rule title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            RuleCode::R000 => "infrastructure",
            RuleCode::R001 => "closed-choice alternative punctuation",
            RuleCode::R002 => "wh-question punctuation",
            RuleCode::R003 => "clarifying question punctuation",
            RuleCode::R004 => "intent missing training phrases",
            RuleCode::R005 => "head intent below phrase minimum",
            RuleCode::R006 => "intent below phrase minimum",
            RuleCode::R007 => "test utterance not in training phrases",
            RuleCode::R008 => "test references unknown intent",
            RuleCode::R009 => "yes/no entity type",
            RuleCode::R010 => "intent missing metadata record",
            RuleCode::R011 => "webhook without error handler",
            RuleCode::R012 => "dangling page",
            RuleCode::R013 => "unreachable page",
            RuleCode::R014 => "unused page",
            RuleCode::R015 => "naming convention violation",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RuleCode::R000 => "R000",
            RuleCode::R001 => "R001",
            RuleCode::R002 => "R002",
            RuleCode::R003 => "R003",
            RuleCode::R004 => "R004",
            RuleCode::R005 => "R005",
            RuleCode::R006 => "R006",
            RuleCode::R007 => "R007",
            RuleCode::R008 => "R008",
            RuleCode::R009 => "R009",
            RuleCode::R010 => "R010",
            RuleCode::R011 => "R011",
            RuleCode::R012 => "R012",
            RuleCode::R013 => "R013",
            RuleCode::R014 => "R014",
            RuleCode::R015 => "R015",
        }
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "R000" => Ok(RuleCode::R000),
            "R001" => Ok(RuleCode::R001),
            "R002" => Ok(RuleCode::R002),
            "R003" => Ok(RuleCode::R003),
            "R004" => Ok(RuleCode::R004),
            "R005" => Ok(RuleCode::R005),
            "R006" => Ok(RuleCode::R006),
            "R007" => Ok(RuleCode::R007),
            "R008" => Ok(RuleCode::R008),
            "R009" => Ok(RuleCode::R009),
            "R010" => Ok(RuleCode::R010),
            "R011" => Ok(RuleCode::R011),
            "R012" => Ok(RuleCode::R012),
            "R013" => Ok(RuleCode::R013),
            "R014" => Ok(RuleCode::R014),
            "R015" => Ok(RuleCode::R015),
            _ => Err(()),
        }
    }
}

/// Everything a checker may read: the immutable resource tree, the shared
/// config, the annotated graph, and intent classifications computed once.
pub struct LintContext<'a> {
    pub tree: &'a ResourceTree,
    pub config: &'a RuleConfig,
    pub graph: &'a AgentGraph,
    /// One cached classification per intent, parallel to `tree.intents`.
    pub intent_classes: Vec<IntentClass>,
    pub verbose: bool,
}

impl<'a> LintContext<'a> {
    #[must_use]
    pub fn new(
        tree: &'a ResourceTree,
        config: &'a RuleConfig,
        graph: &'a AgentGraph,
        verbose: bool,
    ) -> Self {
        let intent_classes = tree
            .intents
            .iter()
            .map(|i| intents::classify(i, config))
            .collect();
        Self {
            tree,
            config,
            graph,
            intent_classes,
            verbose,
        }
    }
}

/// A checker function: pure over the context, findings in discovery order.
pub type CheckFn = fn(&LintContext) -> Vec<Diagnostic>;

/// One registry entry binding a rule code to its checker.
pub struct RuleSpec {
    pub code: RuleCode,
    /// Primary resource kind, used for reporting and (for single-kind rules)
    /// the engine's resource filter.
    pub resource: ResourceKind,
    pub default_enabled: bool,
    /// The checker spans several resource kinds and applies the kind filter
    /// itself; the engine's per-kind gate must not skip it wholesale.
    pub cross_resource: bool,
    pub check: CheckFn,
}

/// The fixed, ordered rule registry.
pub const REGISTRY: &[RuleSpec] = &[
    RuleSpec {
        code: RuleCode::R001,
        resource: ResourceKind::Page,
        default_enabled: true,
        cross_resource: false,
        check: responses::closed_choice,
    },
    RuleSpec {
        code: RuleCode::R002,
        resource: ResourceKind::Page,
        default_enabled: true,
        cross_resource: false,
        check: responses::wh_question,
    },
    RuleSpec {
        code: RuleCode::R003,
        resource: ResourceKind::Page,
        default_enabled: true,
        cross_resource: false,
        check: responses::clarifying_question,
    },
    RuleSpec {
        code: RuleCode::R004,
        resource: ResourceKind::Intent,
        default_enabled: true,
        cross_resource: false,
        check: intents::missing_training_phrases,
    },
    RuleSpec {
        code: RuleCode::R005,
        resource: ResourceKind::Intent,
        default_enabled: true,
        cross_resource: false,
        check: intents::head_intent_minimum,
    },
    RuleSpec {
        code: RuleCode::R006,
        resource: ResourceKind::Intent,
        default_enabled: true,
        cross_resource: false,
        check: intents::general_intent_minimum,
    },
    RuleSpec {
        code: RuleCode::R007,
        resource: ResourceKind::TestCase,
        default_enabled: true,
        cross_resource: false,
        check: test_cases::explicit_phrase_match,
    },
    RuleSpec {
        code: RuleCode::R008,
        resource: ResourceKind::TestCase,
        default_enabled: true,
        cross_resource: false,
        check: test_cases::invalid_intent_reference,
    },
    RuleSpec {
        code: RuleCode::R009,
        resource: ResourceKind::EntityType,
        default_enabled: true,
        cross_resource: false,
        check: entity_types::yes_no_entity,
    },
    RuleSpec {
        code: RuleCode::R010,
        resource: ResourceKind::Intent,
        default_enabled: true,
        cross_resource: false,
        check: intents::missing_metadata,
    },
    RuleSpec {
        code: RuleCode::R011,
        resource: ResourceKind::Page,
        default_enabled: true,
        cross_resource: false,
        check: webhooks::missing_error_handler,
    },
    RuleSpec {
        code: RuleCode::R012,
        resource: ResourceKind::Page,
        default_enabled: true,
        cross_resource: false,
        check: pages::dangling,
    },
    RuleSpec {
        code: RuleCode::R013,
        resource: ResourceKind::Page,
        default_enabled: true,
        cross_resource: false,
        check: pages::unreachable,
    },
    RuleSpec {
        code: RuleCode::R014,
        resource: ResourceKind::Page,
        default_enabled: true,
        cross_resource: false,
        check: pages::unused,
    },
    RuleSpec {
        code: RuleCode::R015,
        resource: ResourceKind::Agent,
        default_enabled: true,
        cross_resource: true,
        check: naming::naming_conventions,
    },
];

/// Counts and the overall rating for one lint run.
#[derive(Debug, Clone, Serialize)]
pub struct LintSummary {
    pub errors: usize,
    pub warnings: usize,
    pub flows: usize,
    pub pages: usize,
    pub intents: usize,
    pub entity_types: usize,
    pub webhooks: usize,
    pub test_cases: usize,
    /// Total resources inspected.
    pub inspected: usize,
    /// `(1 - issues/inspected) * 10`, floored at zero.
    pub rating: f64,
}

/// The data product of one lint run, handed to the reporter.
#[derive(Debug, Clone, Serialize)]
pub struct LintReport {
    pub agent: String,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: LintSummary,
}

impl LintReport {
    /// Returns `true` if any diagnostic has `Severity::Error`.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }
}

/// Run the full lint pass over one agent snapshot.
#[must_use]
pub fn lint(tree: &ResourceTree, config: &RuleConfig, verbose: bool) -> LintReport {
    let graph = AgentGraph::build(tree, config);
    let context = LintContext::new(tree, config, &graph, verbose);

    // Integrity findings from graph construction come first; they are not
    // attached to any rule and cannot be disabled.
    let mut diagnostics = graph.integrity.clone();
    diagnostics.extend(run_rules(REGISTRY, &context));

    let summary = summarize(tree, &diagnostics);
    LintReport {
        agent: tree.display_name.clone(),
        diagnostics,
        summary,
    }
}

/// Load an agent export from disk and lint it.
///
/// Integrity findings from loading come before everything else in the
/// diagnostic sequence.
///
/// # Errors
///
/// Returns an error if the export root is unreadable or the `flows/`
/// collection is missing; no partial diagnostic set is produced then.
pub fn lint_directory(
    root: &std::path::Path,
    config: &RuleConfig,
    verbose: bool,
) -> crate::errors::Result<LintReport> {
    let loaded = crate::loader::load_agent(root, config)?;
    let mut report = lint(&loaded.tree, config, verbose);
    if !loaded.diagnostics.is_empty() {
        let mut diagnostics = loaded.diagnostics;
        diagnostics.append(&mut report.diagnostics);
        report.summary = summarize(&loaded.tree, &diagnostics);
        report.diagnostics = diagnostics;
    }
    Ok(report)
}

/// Dispatch every enabled rule against the context, in registration order.
fn run_rules(registry: &[RuleSpec], context: &LintContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for spec in registry {
        if !spec.default_enabled || context.config.disabled.contains(&spec.code) {
            continue;
        }
        if !spec.cross_resource && !context.config.resource_enabled(spec.resource) {
            continue;
        }
        match catch_unwind(AssertUnwindSafe(|| (spec.check)(context))) {
            Ok(found) => diagnostics.extend(found),
            Err(_) => diagnostics.push(Diagnostic::new(
                RuleCode::R000,
                Severity::Error,
                spec.resource,
                spec.code.as_str(),
                format!("checker {} failed internally; its findings are incomplete", spec.code),
            )),
        }
    }
    diagnostics
}

fn summarize(tree: &ResourceTree, diagnostics: &[Diagnostic]) -> LintSummary {
    let pages: usize = tree.flows.iter().map(|f| f.pages.len()).sum();
    let inspected = tree.flows.len()
        + pages
        + tree.intents.len()
        + tree.entity_types.len()
        + tree.webhooks.len()
        + tree.test_cases.len();
    let issues = diagnostics.len();
    let rating = if inspected == 0 {
        10.0
    } else {
        ((1.0 - issues as f64 / inspected as f64) * 10.0).max(0.0)
    };
    LintSummary {
        errors: diagnostics.iter().filter(|d| d.is_error()).count(),
        warnings: diagnostics.iter().filter(|d| d.is_warning()).count(),
        flows: tree.flows.len(),
        pages,
        intents: tree.intents.len(),
        entity_types: tree.entity_types.len(),
        webhooks: tree.webhooks.len(),
        test_cases: tree.test_cases.len(),
        inspected,
        rating,
    }
}
