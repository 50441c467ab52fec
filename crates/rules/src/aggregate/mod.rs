//! Reducers over a validated, entity-resolved pipeline set.
//!
//! - [`aggregate_by_matches`]: match description → metadata type → actions (CSV report)
//! - [`aggregate_by_actions`]: one merged pipeline document (JSON report)

mod by_action;
mod by_match;
mod ordering;

pub use by_action::aggregate_by_actions;
pub use by_match::{aggregate_by_matches, rule_actions, ActionMap, ByMatchReport, MatchRow};
pub use ordering::{compare_metadata_types, precedence, METADATA_PRECEDENCE};

#[cfg(test)]
mod tests;
