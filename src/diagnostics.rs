//! Structured diagnostics for agent lint findings.
//!
//! Every finding carries a stable rule code, a severity, and enough resource
//! identity (type, display name, optional flow/page location) for a reporter
//! to render a deep link into the agent.

use std::fmt;

use serde::Serialize;

use crate::engine::RuleCode;

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A data-integrity or infrastructure problem.
    Error,
    /// A design-quality rule violation.
    Warning,
}

/// The resource family a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Agent,
    Flow,
    Page,
    Intent,
    EntityType,
    Webhook,
    TestCase,
}

impl ResourceKind {
    /// Stable lowercase name used in reports and config filters.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Agent => "agent",
            ResourceKind::Flow => "flow",
            ResourceKind::Page => "page",
            ResourceKind::Intent => "intent",
            ResourceKind::EntityType => "entity_type",
            ResourceKind::Webhook => "webhook",
            ResourceKind::TestCase => "test_case",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flow/page path for deep-linking a finding inside the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub flow: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

impl Location {
    #[must_use]
    pub fn flow(flow: impl Into<String>) -> Self {
        Self {
            flow: flow.into(),
            page: None,
        }
    }

    #[must_use]
    pub fn page(flow: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            flow: flow.into(),
            page: Some(page.into()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.page {
            Some(page) => write!(f, "{}:{}", self.flow, page),
            None => f.write_str(&self.flow),
        }
    }
}

/// A single lint finding.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Stable rule code (`R000`–`R015`).
    pub code: RuleCode,
    /// Severity level.
    pub severity: Severity,
    /// Resource family the finding refers to.
    pub resource: ResourceKind,
    /// Display name of the offending resource.
    pub display_name: String,
    /// Human-readable message.
    pub message: String,
    /// Flow/page path for deep-link generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Create a new diagnostic for a named resource.
    #[must_use]
    pub fn new(
        code: RuleCode,
        severity: Severity,
        resource: ResourceKind,
        display_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            severity,
            resource,
            display_name: display_name.into(),
            message: message.into(),
            location: None,
        }
    }

    /// Shorthand for a `Severity::Warning` rule finding.
    #[must_use]
    pub fn warning(
        code: RuleCode,
        resource: ResourceKind,
        display_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(code, Severity::Warning, resource, display_name, message)
    }

    /// Shorthand for a `Severity::Error` integrity finding.
    #[must_use]
    pub fn error(
        code: RuleCode,
        resource: ResourceKind,
        display_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(code, Severity::Error, resource, display_name, message)
    }

    /// Attach the flow/page location of this finding.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Returns `true` if this diagnostic is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Returns `true` if this diagnostic is a warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

/// Display format: `R012: page 'Collect Name' (flow:page): message`.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} '{}'",
            self.code, self.resource, self.display_name
        )?;
        if let Some(location) = &self.location {
            write!(f, " ({location})")?;
        }
        write!(f, ": {}", self.message)
    }
}
