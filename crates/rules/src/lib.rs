//! Pipeline configuration validation and aggregation engine.
//!
//! This crate provides:
//! - Typed pipeline document model with polymorphic match clauses and rules
//! - A declarative schema model with keyed (sibling/ancestor driven) field definitions
//! - A recursive validator producing path-tagged errors for a whole document set
//! - Entity/match key normalization and rule match merging
//! - By-match and by-action aggregation, plus CSV/JSON report writers

pub mod aggregate;
pub mod definition;
pub mod error;
pub mod loader;
pub mod merge;
pub mod normalize;
pub mod report;
pub mod schema;
pub mod validation;

pub use error::{PipelineError, Result};
