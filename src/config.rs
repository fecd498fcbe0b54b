//! Lint configuration: the resolved settings consumed by the rule engine.
//!
//! The rc file is YAML. [`RawConfig`] mirrors the file shape; [`RuleConfig`]
//! is the resolved form with parsed rule codes and compiled regexes. The core
//! only ever sees [`RuleConfig`].

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::diagnostics::ResourceKind;
use crate::engine::RuleCode;
use crate::errors::{LintError, Result};

/// Interaction style of the agent. Voice agents get the punctuation rules
/// (R001–R003) that govern how responses are read aloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    #[default]
    Chat,
    Voice,
}

/// Resource subtypes that can carry a naming-convention pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamingSubtype {
    Agent,
    Flow,
    EntityType,
    PageGeneric,
    PageWithForm,
    PageWithWebhook,
    IntentGeneric,
    IntentHead,
    IntentConfirmation,
    IntentEscalation,
    TestCase,
    Webhook,
}

impl NamingSubtype {
    /// Name used in the rc file and in diagnostic messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NamingSubtype::Agent => "agent",
            NamingSubtype::Flow => "flow",
            NamingSubtype::EntityType => "entity_type",
            NamingSubtype::PageGeneric => "page",
            NamingSubtype::PageWithForm => "page_with_form",
            NamingSubtype::PageWithWebhook => "page_with_webhook",
            NamingSubtype::IntentGeneric => "intent",
            NamingSubtype::IntentHead => "intent_head",
            NamingSubtype::IntentConfirmation => "intent_confirmation",
            NamingSubtype::IntentEscalation => "intent_escalation",
            NamingSubtype::TestCase => "test_case",
            NamingSubtype::Webhook => "webhook",
        }
    }
}

/// One compiled naming-convention rule.
#[derive(Debug, Clone)]
pub struct NamingRule {
    pub subtype: NamingSubtype,
    pub pattern: Regex,
    /// The source pattern, quoted back in diagnostics.
    pub raw: String,
}

/// Resolved lint settings.
#[derive(Debug, Clone)]
pub struct RuleConfig {
    pub agent_id: Option<String>,
    pub agent_type: AgentType,
    /// When set, only rules targeting these resource kinds run.
    pub include_resources: Option<HashSet<ResourceKind>>,
    pub exclude_resources: HashSet<ResourceKind>,
    /// Rule codes that never emit.
    pub disabled: HashSet<RuleCode>,
    pub include_flows: Vec<String>,
    pub exclude_flows: Vec<String>,
    pub intent_include_pattern: Option<Regex>,
    pub intent_exclude_pattern: Option<Regex>,
    /// Training phrases are linted for this language only.
    pub language_code: String,
    /// Minimum phrases for a head intent (R005).
    pub head_phrase_threshold: usize,
    /// Minimum phrases for any other intent (R006).
    pub general_phrase_threshold: usize,
    /// Display-name pattern that marks an intent as a head intent.
    pub head_name_pattern: Regex,
    pub test_case_tags: Vec<String>,
    pub test_case_pattern: Option<Regex>,
    pub naming: Vec<NamingRule>,
    /// Pages exempt from reachability rules (webhook-driven routing makes
    /// them live even when the graph says otherwise).
    pub reachability_exempt_pages: HashSet<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            agent_id: None,
            agent_type: AgentType::default(),
            include_resources: None,
            exclude_resources: HashSet::new(),
            disabled: HashSet::new(),
            include_flows: Vec::new(),
            exclude_flows: Vec::new(),
            intent_include_pattern: None,
            intent_exclude_pattern: None,
            language_code: "en".to_string(),
            head_phrase_threshold: 50,
            general_phrase_threshold: 20,
            head_name_pattern: Regex::new("(?i)head").expect("default head pattern must compile"),
            test_case_tags: Vec::new(),
            test_case_pattern: None,
            naming: Vec::new(),
            reachability_exempt_pages: HashSet::new(),
        }
    }
}

impl RuleConfig {
    /// Load and resolve an rc file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, names
    /// an unknown rule code or resource kind, or carries an invalid regex.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let raw: RawConfig = serde_yaml_ng::from_str(&content)?;
        raw.resolve()
    }

    /// Returns `true` if a rule targeting `kind` should run at all.
    #[must_use]
    pub fn resource_enabled(&self, kind: ResourceKind) -> bool {
        if self.exclude_resources.contains(&kind) {
            return false;
        }
        match &self.include_resources {
            Some(included) => included.contains(&kind),
            None => true,
        }
    }

    /// Returns `true` if a flow passes the include/exclude filters.
    #[must_use]
    pub fn flow_enabled(&self, display_name: &str) -> bool {
        if self.exclude_flows.iter().any(|f| f == display_name) {
            return false;
        }
        self.include_flows.is_empty() || self.include_flows.iter().any(|f| f == display_name)
    }

    /// Returns `true` if an intent passes the include/exclude patterns.
    #[must_use]
    pub fn intent_enabled(&self, display_name: &str) -> bool {
        if let Some(exclude) = &self.intent_exclude_pattern {
            if exclude.is_match(display_name) {
                return false;
            }
        }
        match &self.intent_include_pattern {
            Some(include) => include.is_match(display_name),
            None => true,
        }
    }

    /// Returns `true` if a test case passes the tag and name filters.
    #[must_use]
    pub fn test_case_enabled(&self, display_name: &str, tags: &[String]) -> bool {
        if let Some(pattern) = &self.test_case_pattern {
            if !pattern.is_match(display_name) {
                return false;
            }
        }
        self.test_case_tags.is_empty()
            || tags.iter().any(|t| self.test_case_tags.contains(t))
    }
}

// ── Raw file shape ──────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    agent_id: Option<String>,
    #[serde(default)]
    agent_type: AgentType,
    #[serde(default)]
    resources: RawResources,
    /// Comma-separated disabled rule codes, e.g. `"R001,R009"`.
    #[serde(default)]
    disable: String,
    #[serde(default)]
    flows: RawFlows,
    #[serde(default)]
    intents: RawIntents,
    #[serde(default)]
    test_cases: RawTestCases,
    #[serde(default)]
    naming: RawNaming,
    #[serde(default)]
    reachability: RawReachability,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawResources {
    #[serde(default)]
    include: Option<Vec<String>>,
    #[serde(default)]
    exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFlows {
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIntents {
    #[serde(default)]
    include_pattern: Option<String>,
    #[serde(default)]
    exclude_pattern: Option<String>,
    #[serde(default = "default_language")]
    language_code: String,
    #[serde(default = "default_head_pattern")]
    head_name_pattern: String,
    #[serde(default = "default_head_threshold")]
    head_phrase_threshold: usize,
    #[serde(default = "default_general_threshold")]
    general_phrase_threshold: usize,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_head_pattern() -> String {
    "(?i)head".to_string()
}

fn default_head_threshold() -> usize {
    50
}

fn default_general_threshold() -> usize {
    20
}

impl Default for RawIntents {
    fn default() -> Self {
        Self {
            include_pattern: None,
            exclude_pattern: None,
            language_code: default_language(),
            head_name_pattern: default_head_pattern(),
            head_phrase_threshold: default_head_threshold(),
            general_phrase_threshold: default_general_threshold(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTestCases {
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    display_name_pattern: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNaming {
    #[serde(default)]
    agent: Option<String>,
    #[serde(default)]
    flow: Option<String>,
    #[serde(default)]
    entity_type: Option<String>,
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    page_with_form: Option<String>,
    #[serde(default)]
    page_with_webhook: Option<String>,
    #[serde(default)]
    intent: Option<String>,
    #[serde(default)]
    intent_head: Option<String>,
    #[serde(default)]
    intent_confirmation: Option<String>,
    #[serde(default)]
    intent_escalation: Option<String>,
    #[serde(default)]
    test_case: Option<String>,
    #[serde(default)]
    webhook: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReachability {
    #[serde(default)]
    exempt_pages: Vec<String>,
}

fn parse_resource_kind(name: &str) -> Result<ResourceKind> {
    match name.trim() {
        "agent" => Ok(ResourceKind::Agent),
        "flow" => Ok(ResourceKind::Flow),
        "page" => Ok(ResourceKind::Page),
        "intent" => Ok(ResourceKind::Intent),
        "entity_type" => Ok(ResourceKind::EntityType),
        "webhook" => Ok(ResourceKind::Webhook),
        "test_case" => Ok(ResourceKind::TestCase),
        other => Err(LintError::Config {
            message: format!("unknown resource kind: '{other}'"),
        }),
    }
}

fn compile(subtype: NamingSubtype, raw: &str) -> Result<NamingRule> {
    let pattern = Regex::new(raw).map_err(|source| LintError::InvalidPattern {
        subtype: subtype.as_str().to_string(),
        source,
    })?;
    Ok(NamingRule {
        subtype,
        pattern,
        raw: raw.to_string(),
    })
}

fn compile_optional(raw: Option<&str>, what: &str) -> Result<Option<Regex>> {
    raw.map(|r| {
        Regex::new(r).map_err(|e| LintError::Config {
            message: format!("invalid {what} pattern: {e}"),
        })
    })
    .transpose()
}

impl RawConfig {
    fn resolve(self) -> Result<RuleConfig> {
        let include_resources = self
            .resources
            .include
            .map(|names| {
                names
                    .iter()
                    .map(|n| parse_resource_kind(n))
                    .collect::<Result<HashSet<_>>>()
            })
            .transpose()?;
        let exclude_resources = self
            .resources
            .exclude
            .iter()
            .map(|n| parse_resource_kind(n))
            .collect::<Result<HashSet<_>>>()?;

        let disabled = self
            .disable
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|code| match code.parse::<RuleCode>() {
                // R000 carries integrity findings and checker faults; it is
                // not a toggleable rule.
                Ok(RuleCode::R000) => Err(LintError::Config {
                    message: "rule R000 reports integrity findings and cannot be disabled"
                        .to_string(),
                }),
                Ok(parsed) => Ok(parsed),
                Err(()) => Err(LintError::Config {
                    message: format!("unknown rule code in disable list: '{code}'"),
                }),
            })
            .collect::<Result<HashSet<_>>>()?;

        let head_name_pattern = Regex::new(&self.intents.head_name_pattern).map_err(|e| {
            LintError::Config {
                message: format!("invalid head_name_pattern: {e}"),
            }
        })?;

        let raw_naming = [
            (NamingSubtype::Agent, self.naming.agent),
            (NamingSubtype::Flow, self.naming.flow),
            (NamingSubtype::EntityType, self.naming.entity_type),
            (NamingSubtype::PageGeneric, self.naming.page),
            (NamingSubtype::PageWithForm, self.naming.page_with_form),
            (NamingSubtype::PageWithWebhook, self.naming.page_with_webhook),
            (NamingSubtype::IntentGeneric, self.naming.intent),
            (NamingSubtype::IntentHead, self.naming.intent_head),
            (
                NamingSubtype::IntentConfirmation,
                self.naming.intent_confirmation,
            ),
            (
                NamingSubtype::IntentEscalation,
                self.naming.intent_escalation,
            ),
            (NamingSubtype::TestCase, self.naming.test_case),
            (NamingSubtype::Webhook, self.naming.webhook),
        ];
        let mut naming = Vec::new();
        for (subtype, pattern) in raw_naming {
            if let Some(pattern) = pattern.filter(|p| !p.is_empty()) {
                naming.push(compile(subtype, &pattern)?);
            }
        }

        Ok(RuleConfig {
            agent_id: self.agent_id,
            agent_type: self.agent_type,
            include_resources,
            exclude_resources,
            disabled,
            include_flows: self.flows.include,
            exclude_flows: self.flows.exclude,
            intent_include_pattern: compile_optional(
                self.intents.include_pattern.as_deref(),
                "intent include",
            )?,
            intent_exclude_pattern: compile_optional(
                self.intents.exclude_pattern.as_deref(),
                "intent exclude",
            )?,
            language_code: self.intents.language_code,
            head_phrase_threshold: self.intents.head_phrase_threshold,
            general_phrase_threshold: self.intents.general_phrase_threshold,
            head_name_pattern,
            test_case_tags: self.test_cases.tags,
            test_case_pattern: compile_optional(
                self.test_cases.display_name_pattern.as_deref(),
                "test case",
            )?,
            naming,
            reachability_exempt_pages: self.reachability.exempt_pages.into_iter().collect(),
        })
    }
}

/// Parse rc-file content directly (for callers that already read the file).
///
/// # Errors
///
/// Same failure modes as [`RuleConfig::load`].
pub fn parse_config(content: &str) -> Result<RuleConfig> {
    let raw: RawConfig = serde_yaml_ng::from_str(content)?;
    raw.resolve()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_enables_everything() {
        let config = RuleConfig::default();
        assert_eq!(config.agent_type, AgentType::Chat);
        assert!(config.disabled.is_empty());
        assert!(config.resource_enabled(ResourceKind::Page));
        assert!(config.flow_enabled("Any Flow"));
        assert!(config.intent_enabled("any.intent"));
        assert!(config.test_case_enabled("any case", &[]));
        assert_eq!(config.head_phrase_threshold, 50);
        assert_eq!(config.general_phrase_threshold, 20);
        assert_eq!(config.language_code, "en");
    }

    #[test]
    fn parse_empty_document_gives_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.agent_type, AgentType::Chat);
        assert!(config.naming.is_empty());
    }

    #[test]
    fn parse_disable_list_comma_separated() {
        let config = parse_config("disable: \"R001, R009,R014\"").unwrap();
        assert!(config.disabled.contains(&RuleCode::R001));
        assert!(config.disabled.contains(&RuleCode::R009));
        assert!(config.disabled.contains(&RuleCode::R014));
        assert_eq!(config.disabled.len(), 3);
    }

    #[test]
    fn unknown_rule_code_is_config_error() {
        let err = parse_config("disable: \"R099\"").unwrap_err();
        assert!(err.to_string().contains("R099"), "got: {err}");
    }

    #[test]
    fn r000_cannot_be_disabled() {
        let err = parse_config("disable: \"R000\"").unwrap_err();
        assert!(err.to_string().contains("R000"), "got: {err}");
        assert!(err.to_string().contains("cannot be disabled"), "got: {err}");
    }

    #[test]
    fn parse_agent_type_voice() {
        let config = parse_config("agent_type: voice").unwrap();
        assert_eq!(config.agent_type, AgentType::Voice);
    }

    #[test]
    fn resource_include_list_filters() {
        let config = parse_config("resources:\n  include: [intent, test_case]\n").unwrap();
        assert!(config.resource_enabled(ResourceKind::Intent));
        assert!(config.resource_enabled(ResourceKind::TestCase));
        assert!(!config.resource_enabled(ResourceKind::Page));
    }

    #[test]
    fn resource_exclude_wins_over_include() {
        let config =
            parse_config("resources:\n  include: [page, intent]\n  exclude: [page]\n").unwrap();
        assert!(!config.resource_enabled(ResourceKind::Page));
        assert!(config.resource_enabled(ResourceKind::Intent));
    }

    #[test]
    fn unknown_resource_kind_is_config_error() {
        let err = parse_config("resources:\n  exclude: [gadget]\n").unwrap_err();
        assert!(err.to_string().contains("gadget"), "got: {err}");
    }

    #[test]
    fn flow_filters() {
        let config =
            parse_config("flows:\n  include: [Billing]\n  exclude: [Legacy]\n").unwrap();
        assert!(config.flow_enabled("Billing"));
        assert!(!config.flow_enabled("Legacy"));
        assert!(!config.flow_enabled("Other"));
    }

    #[test]
    fn intent_patterns() {
        let config = parse_config(
            "intents:\n  include_pattern: \"^order\"\n  exclude_pattern: \"deprecated\"\n",
        )
        .unwrap();
        assert!(config.intent_enabled("order.pizza"));
        assert!(!config.intent_enabled("order.deprecated"));
        assert!(!config.intent_enabled("greet"));
    }

    #[test]
    fn thresholds_configurable() {
        let config = parse_config(
            "intents:\n  head_phrase_threshold: 10\n  general_phrase_threshold: 3\n",
        )
        .unwrap();
        assert_eq!(config.head_phrase_threshold, 10);
        assert_eq!(config.general_phrase_threshold, 3);
    }

    #[test]
    fn test_case_tag_filter() {
        let config = parse_config("test_cases:\n  tags: [\"#smoke\"]\n").unwrap();
        assert!(config.test_case_enabled("any", &["#smoke".to_string()]));
        assert!(!config.test_case_enabled("any", &["#slow".to_string()]));
    }

    #[test]
    fn naming_patterns_compile() {
        let config = parse_config(
            "naming:\n  flow: \"^[A-Z]\"\n  intent_head: \"^head\\\\.\"\n",
        )
        .unwrap();
        assert_eq!(config.naming.len(), 2);
        assert_eq!(config.naming[0].subtype, NamingSubtype::Flow);
        assert!(config.naming[0].pattern.is_match("Billing"));
        assert_eq!(config.naming[1].subtype, NamingSubtype::IntentHead);
    }

    #[test]
    fn empty_naming_pattern_is_dropped() {
        let config = parse_config("naming:\n  flow: \"\"\n").unwrap();
        assert!(config.naming.is_empty());
    }

    #[test]
    fn invalid_naming_pattern_is_error() {
        let err = parse_config("naming:\n  flow: \"[unclosed\"\n").unwrap_err();
        assert!(matches!(err, LintError::InvalidPattern { .. }), "got: {err}");
    }

    #[test]
    fn reachability_exemptions() {
        let config =
            parse_config("reachability:\n  exempt_pages: [\"Webhook Router\"]\n").unwrap();
        assert!(config
            .reachability_exempt_pages
            .contains("Webhook Router"));
    }

    #[test]
    fn unknown_top_level_key_rejected() {
        assert!(parse_config("no_such_section: true").is_err());
    }
}
