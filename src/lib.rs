pub mod checkers;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod loader;
pub mod models;
pub mod reporter;

// Re-export key types at crate root for convenience.
pub use config::{parse_config, AgentType, RuleConfig};
pub use diagnostics::{Diagnostic, Location, ResourceKind, Severity};
pub use engine::{lint, lint_directory, LintReport, LintSummary, RuleCode};
pub use errors::{LintError, Result};
pub use graph::{AgentGraph, PageClass};
pub use loader::load_agent;
pub use models::ResourceTree;
pub use reporter::{render, ReportFormat};
