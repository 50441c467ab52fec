//! Typed pipeline document model with serde (de)serialization.
//!
//! Defines the type hierarchy for pipeline documents:
//! - `SourceDocument`: raw JSON tree as loaded, input to the validator
//! - `PipelineDocument`: typed document produced once validation passes
//! - `MatchClause` / `MatchValue`: polymorphic match conditions keyed by `type`
//! - `Rule` / `RuleAction`: polymorphic rule configs keyed by `name`

mod actions;
mod document;
mod matching;
mod rule;

pub use actions::*;
pub use document::*;
pub use matching::*;
pub use rule::*;
