//! Conversation graph: pages as nodes, transition routes as labeled edges.
//!
//! Built once per lint run from an immutable [`ResourceTree`] snapshot. Edge
//! registration preserves source route order, so rebuilding from the same
//! tree yields a structurally identical graph. Unresolvable route targets are
//! queued as data-integrity diagnostics and the edge is omitted — they never
//! abort construction.

use std::collections::HashMap;

use crate::config::RuleConfig;
use crate::diagnostics::{Diagnostic, Location, ResourceKind};
use crate::engine::RuleCode;
use crate::models::{is_special_target, Flow, ResourceTree, Route};

/// Display name of the synthetic page representing a flow's entry.
pub const START_PAGE: &str = "START_PAGE";

/// Reachability classification of a page node.
///
/// The three defect classes partition on the incoming/outgoing boolean pair;
/// a page with both is healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageClass {
    /// Has incoming and outgoing edges.
    Healthy,
    /// Has incoming edges but no way out.
    Dangling,
    /// Has outgoing edges but nothing transitions to it.
    Unreachable,
    /// No edges at all.
    Unused,
}

/// A page node with its computed reachability annotations.
#[derive(Debug, Clone)]
pub struct PageNode {
    pub display_name: String,
    /// Index into `Flow::pages`; `None` for the synthetic start page.
    pub page_index: Option<usize>,
    pub has_incoming: bool,
    pub has_outgoing: bool,
    pub reachable_from_start: bool,
    /// Exempt from reachability rules via config (webhook-driven routing).
    pub exempt: bool,
}

impl PageNode {
    /// Classify this node from its incoming/outgoing annotations.
    #[must_use]
    pub fn class(&self) -> PageClass {
        match (self.has_incoming, self.has_outgoing) {
            (true, true) => PageClass::Healthy,
            (true, false) => PageClass::Dangling,
            (false, true) => PageClass::Unreachable,
            (false, false) => PageClass::Unused,
        }
    }
}

/// A directed edge: one transition route or a synthetic entry edge.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Source node; `None` for the synthetic flow-entry edge.
    pub from: Option<usize>,
    /// Target node; `None` for end-of-flow/session, self, and cross-flow
    /// targets, which count as outgoing but create no node.
    pub to: Option<usize>,
    /// Trigger description, for reporting.
    pub trigger: String,
    pub synthetic: bool,
}

/// The graph of one flow.
#[derive(Debug, Clone)]
pub struct FlowGraph {
    pub flow_name: String,
    pub nodes: Vec<PageNode>,
    pub edges: Vec<Edge>,
}

impl FlowGraph {
    /// The node for the synthetic start page.
    #[must_use]
    pub fn start(&self) -> &PageNode {
        &self.nodes[0]
    }
}

/// All flow graphs for one agent, plus integrity findings queued during
/// construction.
#[derive(Debug, Clone, Default)]
pub struct AgentGraph {
    pub flows: Vec<FlowGraph>,
    pub integrity: Vec<Diagnostic>,
}

impl AgentGraph {
    /// Build one graph per enabled flow and annotate reachability.
    #[must_use]
    pub fn build(tree: &ResourceTree, config: &RuleConfig) -> Self {
        let mut graph = AgentGraph::default();
        for flow in &tree.flows {
            if !config.flow_enabled(flow.display_name()) {
                continue;
            }
            graph.flows.push(build_flow_graph(
                flow,
                config,
                &mut graph.integrity,
            ));
        }
        for flow_graph in &mut graph.flows {
            annotate_reachability(flow_graph);
        }
        graph
    }
}

fn build_flow_graph(
    flow: &Flow,
    config: &RuleConfig,
    integrity: &mut Vec<Diagnostic>,
) -> FlowGraph {
    let flow_name = flow.display_name().to_string();

    let mut nodes = vec![PageNode {
        display_name: START_PAGE.to_string(),
        page_index: None,
        has_incoming: false,
        has_outgoing: false,
        reachable_from_start: false,
        exempt: config.reachability_exempt_pages.contains(START_PAGE),
    }];
    for (index, page) in flow.pages.iter().enumerate() {
        nodes.push(PageNode {
            display_name: page.display_name.clone(),
            page_index: Some(index),
            has_incoming: false,
            has_outgoing: false,
            reachable_from_start: false,
            exempt: config.reachability_exempt_pages.contains(&page.display_name),
        });
    }

    let by_name: HashMap<String, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.display_name.clone(), i))
        .collect();

    let mut edges = Vec::new();

    // The flow entry itself: the start page is always reachable.
    edges.push(Edge {
        from: None,
        to: Some(0),
        trigger: "flow entry".to_string(),
        synthetic: true,
    });
    nodes[0].has_incoming = true;

    // Flow-level routes and handlers belong to the start page.
    register_routes(
        &flow_name,
        0,
        flow.record.transition_routes.iter(),
        &by_name,
        &mut nodes,
        &mut edges,
        integrity,
    );
    register_event_targets(
        0,
        flow.record
            .event_handlers
            .iter()
            .map(|e| (e.event.as_str(), e.target_page.as_deref(), e.target_flow.as_deref())),
        &flow_name,
        &by_name,
        &mut nodes,
        &mut edges,
        integrity,
    );

    for (index, page) in flow.pages.iter().enumerate() {
        let node = index + 1;
        register_routes(
            &flow_name,
            node,
            page.transition_routes.iter(),
            &by_name,
            &mut nodes,
            &mut edges,
            integrity,
        );
        register_event_targets(
            node,
            page.event_handlers
                .iter()
                .map(|e| (e.event.as_str(), e.target_page.as_deref(), e.target_flow.as_deref())),
            &flow_name,
            &by_name,
            &mut nodes,
            &mut edges,
            integrity,
        );
    }

    FlowGraph {
        flow_name,
        nodes,
        edges,
    }
}

#[allow(clippy::too_many_arguments)]
fn register_routes<'a>(
    flow_name: &str,
    from: usize,
    routes: impl Iterator<Item = &'a Route>,
    by_name: &HashMap<String, usize>,
    nodes: &mut [PageNode],
    edges: &mut Vec<Edge>,
    integrity: &mut Vec<Diagnostic>,
) {
    for route in routes {
        register_target(
            from,
            route.target_page.as_deref(),
            route.target_flow.as_deref(),
            &route.trigger(),
            flow_name,
            by_name,
            nodes,
            edges,
            integrity,
        );
    }
}

fn register_event_targets<'a>(
    from: usize,
    handlers: impl Iterator<Item = (&'a str, Option<&'a str>, Option<&'a str>)>,
    flow_name: &str,
    by_name: &HashMap<String, usize>,
    nodes: &mut [PageNode],
    edges: &mut Vec<Edge>,
    integrity: &mut Vec<Diagnostic>,
) {
    for (event, target_page, target_flow) in handlers {
        if target_page.is_none() && target_flow.is_none() {
            continue;
        }
        register_target(
            from,
            target_page,
            target_flow,
            &format!("event:{event}"),
            flow_name,
            by_name,
            nodes,
            edges,
            integrity,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn register_target(
    from: usize,
    target_page: Option<&str>,
    target_flow: Option<&str>,
    trigger: &str,
    flow_name: &str,
    by_name: &HashMap<String, usize>,
    nodes: &mut [PageNode],
    edges: &mut Vec<Edge>,
    integrity: &mut Vec<Diagnostic>,
) {
    if let Some(target) = target_page {
        if is_special_target(target) {
            nodes[from].has_outgoing = true;
            edges.push(Edge {
                from: Some(from),
                to: None,
                trigger: trigger.to_string(),
                synthetic: false,
            });
        } else if let Some(&to) = by_name.get(target) {
            nodes[from].has_outgoing = true;
            nodes[to].has_incoming = true;
            edges.push(Edge {
                from: Some(from),
                to: Some(to),
                trigger: trigger.to_string(),
                synthetic: false,
            });
        } else {
            // Unresolvable target: omit the edge, queue an integrity finding.
            let source = nodes[from].display_name.clone();
            integrity.push(
                Diagnostic::error(
                    RuleCode::R000,
                    ResourceKind::Page,
                    source.clone(),
                    format!("route ({trigger}) targets unknown page '{target}'"),
                )
                .at(Location::page(flow_name, source)),
            );
        }
    } else if target_flow.is_some() {
        // Cross-flow transition: outgoing, resolved in the target flow's graph.
        nodes[from].has_outgoing = true;
        edges.push(Edge {
            from: Some(from),
            to: None,
            trigger: trigger.to_string(),
            synthetic: false,
        });
    }
}

/// Dedicated analysis pass: mark every node reachable from the flow entry by
/// following explicit and synthetic edges.
fn annotate_reachability(graph: &mut FlowGraph) {
    let mut stack = vec![0usize];
    while let Some(node) = stack.pop() {
        if graph.nodes[node].reachable_from_start {
            continue;
        }
        graph.nodes[node].reachable_from_start = true;
        for edge in &graph.edges {
            if edge.from == Some(node) {
                if let Some(to) = edge.to {
                    if !graph.nodes[to].reachable_from_start {
                        stack.push(to);
                    }
                }
            }
        }
    }
}
