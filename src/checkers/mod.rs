//! One module per rule family. Every checker is a pure function from the
//! shared [`crate::engine::LintContext`] to a list of findings.

pub mod entity_types;
pub mod intents;
pub mod naming;
pub mod pages;
pub mod responses;
pub mod test_cases;
pub mod webhooks;
