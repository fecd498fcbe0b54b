//! Resource records for an exported agent definition.
//!
//! Each struct mirrors one JSON record shape from the export. Optional fields
//! are modeled explicitly with `Option`/`#[serde(default)]` so that a missing
//! key is a distinct, typed case rather than an ad hoc lookup failure.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Transition targets that end the conversation or stay in place rather than
/// naming another page. These count as outgoing edges but create no node.
pub const SPECIAL_TARGETS: &[&str] = &["END_FLOW", "END_SESSION", "CURRENT_PAGE", "PREVIOUS_PAGE"];

/// Returns `true` if a transition target is a special end/self target.
#[must_use]
pub fn is_special_target(target: &str) -> bool {
    SPECIAL_TARGETS.contains(&target)
}

/// One text response message with ordered variants.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextMessage {
    #[serde(default)]
    pub text: Vec<String>,
}

/// A single response message inside a fulfillment.
///
/// Non-text payloads (custom, live-agent handoff) are present in exports but
/// carry nothing the text rules inspect, so only `text` is materialized.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub text: Option<TextMessage>,
}

/// Ordered response messages plus optional webhook reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fulfillment {
    #[serde(default)]
    pub messages: Vec<ResponseMessage>,
    #[serde(default)]
    pub webhook: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

impl Fulfillment {
    /// All text variants across this fulfillment's messages, in source order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter_map(|m| m.text.as_ref())
            .flat_map(|t| t.text.iter().map(String::as_str))
    }
}

/// An event handler bound to a page or form parameter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHandler {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub trigger_fulfillment: Option<Fulfillment>,
    #[serde(default)]
    pub target_page: Option<String>,
    #[serde(default)]
    pub target_flow: Option<String>,
}

impl EventHandler {
    /// Returns `true` if this handler is bound to a webhook-error event.
    #[must_use]
    pub fn is_webhook_error(&self) -> bool {
        self.event.starts_with("webhook.error")
    }

    /// Returns `true` if this handler is bound to a no-match event.
    #[must_use]
    pub fn is_no_match(&self) -> bool {
        self.event.contains("no-match")
    }
}

/// A transition route: trigger condition plus target plus optional fulfillment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub target_page: Option<String>,
    #[serde(default)]
    pub target_flow: Option<String>,
    #[serde(default)]
    pub trigger_fulfillment: Option<Fulfillment>,
}

impl Route {
    /// Short trigger description used in diagnostic messages.
    #[must_use]
    pub fn trigger(&self) -> String {
        match (&self.intent, &self.condition) {
            (Some(intent), Some(_)) => format!("intent+condition:{intent}"),
            (Some(intent), None) => format!("intent:{intent}"),
            (None, Some(condition)) => format!("condition:{condition}"),
            (None, None) => "route".to_string(),
        }
    }
}

/// One form parameter with its fill-time handlers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormParameter {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub fill_behavior: Option<FillBehavior>,
}

/// Initial prompt and reprompt handlers for one form parameter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillBehavior {
    #[serde(default)]
    pub initial_prompt_fulfillment: Option<Fulfillment>,
    #[serde(default)]
    pub reprompt_event_handlers: Vec<EventHandler>,
}

/// A form attached to a page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Form {
    #[serde(default)]
    pub parameters: Vec<FormParameter>,
}

/// One page record within a flow.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub entry_fulfillment: Option<Fulfillment>,
    #[serde(default)]
    pub form: Option<Form>,
    #[serde(default)]
    pub transition_routes: Vec<Route>,
    #[serde(default)]
    pub event_handlers: Vec<EventHandler>,
    #[serde(default)]
    pub transition_route_groups: Vec<String>,
}

impl Page {
    /// Returns `true` if the page collects input through a non-empty form.
    #[must_use]
    pub fn has_form(&self) -> bool {
        self.form.as_ref().is_some_and(|f| !f.parameters.is_empty())
    }

    /// Returns `true` if any fulfillment on this page references a webhook.
    #[must_use]
    pub fn references_webhook(&self) -> bool {
        self.fulfillments().any(|f| f.webhook.is_some())
    }

    /// All fulfillments attached to this page: entry, routes, events, and
    /// form parameter prompts/reprompts, in source order.
    pub fn fulfillments(&self) -> impl Iterator<Item = &Fulfillment> {
        self.entry_fulfillment
            .iter()
            .chain(
                self.transition_routes
                    .iter()
                    .filter_map(|r| r.trigger_fulfillment.as_ref()),
            )
            .chain(
                self.event_handlers
                    .iter()
                    .filter_map(|e| e.trigger_fulfillment.as_ref()),
            )
            .chain(self.form.iter().flat_map(|f| {
                f.parameters.iter().filter_map(|p| {
                    p.fill_behavior
                        .as_ref()
                        .and_then(|b| b.initial_prompt_fulfillment.as_ref())
                })
            }))
    }

    /// All event handlers on this page, including form reprompt handlers.
    pub fn all_event_handlers(&self) -> impl Iterator<Item = &EventHandler> {
        self.event_handlers.iter().chain(
            self.form
                .iter()
                .flat_map(|f| f.parameters.iter())
                .filter_map(|p| p.fill_behavior.as_ref())
                .flat_map(|b| b.reprompt_event_handlers.iter()),
        )
    }
}

/// The flow-level record. Its routes and handlers belong to the synthetic
/// start page (`START_PAGE`) of the flow.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub transition_routes: Vec<Route>,
    #[serde(default)]
    pub event_handlers: Vec<EventHandler>,
    #[serde(default)]
    pub transition_route_groups: Vec<String>,
}

/// A flow with its pages, assembled by the loader.
#[derive(Debug, Clone, Default)]
pub struct Flow {
    pub record: FlowRecord,
    /// Pages in export order (directory listing order, sorted by the loader
    /// for deterministic runs).
    pub pages: Vec<Page>,
}

impl Flow {
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.record.display_name
    }
}

/// One part of a training phrase; the full utterance is the concatenation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhrasePart {
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "parameterId")]
    pub parameter_id: Option<String>,
}

/// One training phrase.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPhrase {
    #[serde(default)]
    pub parts: Vec<PhrasePart>,
    #[serde(default)]
    pub repeat_count: Option<u32>,
}

impl TrainingPhrase {
    /// The full utterance text.
    #[must_use]
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

/// Intent metadata record (the companion file next to the phrase directory).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// An intent assembled from its metadata record and per-language phrases.
#[derive(Debug, Clone, Default)]
pub struct Intent {
    pub display_name: String,
    /// `None` when the companion metadata record is missing (R010).
    pub metadata: Option<IntentMetadata>,
    /// Phrases for the configured language code.
    pub training_phrases: Vec<TrainingPhrase>,
    pub language_code: String,
}

impl Intent {
    /// Labels from the metadata record, empty when the record is missing.
    #[must_use]
    pub fn labels(&self) -> &BTreeMap<String, String> {
        static EMPTY: BTreeMap<String, String> = BTreeMap::new();
        self.metadata.as_ref().map_or(&EMPTY, |m| &m.labels)
    }
}

/// One entity entry: canonical value plus synonyms.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityEntry {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

/// An entity type record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityType {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub entities: Vec<EntityEntry>,
}

/// A webhook record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: String,
}

/// The user side of one conversation turn.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    #[serde(default)]
    pub input: Option<InputText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputText {
    #[serde(default)]
    pub text: Option<TextMessage>,
}

impl UserInput {
    /// First text variant of the utterance, if any.
    #[must_use]
    pub fn utterance(&self) -> Option<&str> {
        self.input
            .as_ref()
            .and_then(|i| i.text.as_ref())
            .and_then(|t| t.text.first())
            .map(String::as_str)
    }
}

/// The agent side of one conversation turn: the expected triggered intent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualAgentOutput {
    #[serde(default)]
    pub triggered_intent: Option<TriggeredIntent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredIntent {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: String,
}

/// One test-case conversation turn.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    #[serde(default)]
    pub user_input: Option<UserInput>,
    #[serde(default)]
    pub virtual_agent_output: Option<VirtualAgentOutput>,
}

/// A test case record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub test_case_conversation_turns: Vec<ConversationTurn>,
}

/// The fully materialized agent export.
#[derive(Debug, Clone, Default)]
pub struct ResourceTree {
    pub display_name: String,
    pub flows: Vec<Flow>,
    pub intents: Vec<Intent>,
    pub entity_types: Vec<EntityType>,
    pub webhooks: Vec<Webhook>,
    pub test_cases: Vec<TestCase>,
}
